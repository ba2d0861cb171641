use super::*;
use crate::migration::MigrationKind;

fn m(version: &str) -> MigrationDescriptor {
    MigrationDescriptor::action(version, "123", None)
}

fn with_description(version: &str, description: &str) -> MigrationDescriptor {
    MigrationDescriptor::action(version, description, None)
}

fn versions(items: &[MigrationDescriptor]) -> Vec<&str> {
    items.iter().map(|d| d.version.as_str()).collect()
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn test_pending_when_nothing_applied() {
    let local = vec![m("0001")];
    let remote: Vec<MigrationDescriptor> = vec![];

    let result = analyze(&local, &remote);

    assert_eq!(result.pending, local);
    assert!(result.invalid.is_empty());
    assert_eq!(result.latest_applied_version, None);
}

#[test]
fn test_pending_after_applied() {
    let local = vec![m("0001"), m("0002")];
    let remote = vec![m("0001")];

    let result = analyze(&local, &remote);

    assert_eq!(result.pending, vec![m("0002")]);
    assert!(result.invalid.is_empty());
    assert_eq!(result.latest_applied_version.as_deref(), Some("0001"));
}

#[test]
fn test_remote_version_missed_locally() {
    let local = vec![m("0002")];
    let remote = vec![m("0001"), m("0002")];

    let result = analyze(&local, &remote);

    assert_eq!(
        result.invalid,
        vec![InvalidVersion::new("0001", InvalidCause::MissedLocally)]
    );
    assert!(result.pending.is_empty());
    assert_eq!(result.latest_applied_version.as_deref(), Some("0002"));
}

#[test]
fn test_local_version_missed_remotely() {
    let local = vec![m("0001"), m("0002")];
    let remote = vec![m("0002")];

    let result = analyze(&local, &remote);

    assert_eq!(
        result.invalid,
        vec![InvalidVersion::new("0001", InvalidCause::MissedRemotely)]
    );
    assert!(result.pending.is_empty());
    assert_eq!(result.latest_applied_version.as_deref(), Some("0002"));
}

#[test]
fn test_changed_description_is_different() {
    let local = vec![with_description("0001", "desc1")];
    let remote = vec![with_description("0001", "desc2")];

    let result = analyze(&local, &remote);

    assert_eq!(
        result.invalid,
        vec![InvalidVersion::new("0001", InvalidCause::Different)]
    );
    assert_eq!(result.latest_applied_version.as_deref(), Some("0001"));
}

#[test]
fn test_changed_checksum_is_different() {
    let local = vec![MigrationDescriptor::script(
        "0001",
        "init",
        Some("V0001__init.cypher".to_string()),
        &["CREATE (:A)"],
    )];
    let remote = vec![MigrationDescriptor::script(
        "0001",
        "init",
        Some("V0001__init.cypher".to_string()),
        &["CREATE (:B)"],
    )];

    let result = analyze(&local, &remote);

    assert_eq!(
        result.invalid,
        vec![InvalidVersion::new("0001", InvalidCause::Different)]
    );
}

#[test]
fn test_changed_kind_is_different() {
    let mut remote = m("0001");
    remote.kind = MigrationKind::Script;

    let result = analyze(&[m("0001")], &[remote]);

    assert_eq!(result.invalid[0].cause, InvalidCause::Different);
}

#[test]
fn test_nothing_local_nothing_remote() {
    let empty: Vec<MigrationDescriptor> = vec![];
    let result = analyze(&empty, &empty);
    assert_eq!(result, Analysis::default());
    assert!(result.is_up_to_date());
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn test_all_applied_is_up_to_date() {
    let local = vec![m("1"), m("1.1"), m("2")];
    let remote = local.clone();

    let result = analyze(&local, &remote);

    assert!(result.pending.is_empty());
    assert!(result.invalid.is_empty());
    assert!(result.is_up_to_date());
    assert_eq!(result.latest_applied_version.as_deref(), Some("2"));
}

#[test]
fn test_empty_remote_never_reports_invalid() {
    let local = vec![m("0.3.0"), m("0.20.0"), m("1")];
    let remote: Vec<MigrationDescriptor> = vec![];

    let result = analyze(&local, &remote);

    assert_eq!(result.pending, local);
    assert!(result.is_valid());
}

#[test]
fn test_outputs_are_in_version_order() {
    // Versions chosen so that string order and version order disagree.
    let local = vec![
        m("2"),
        m("9"),
        with_description("10", "changed"),
        m("11"),
        m("20"),
        m("100"),
    ];
    let remote = vec![m("3"), m("10"), m("11"), m("12"), m("20")];

    let result = analyze(&local, &remote);

    assert_eq!(
        result.invalid,
        vec![
            InvalidVersion::new("2", InvalidCause::MissedRemotely),
            InvalidVersion::new("3", InvalidCause::MissedLocally),
            InvalidVersion::new("9", InvalidCause::MissedRemotely),
            InvalidVersion::new("10", InvalidCause::Different),
            InvalidVersion::new("12", InvalidCause::MissedLocally),
        ]
    );
    assert_eq!(versions(&result.pending), vec!["100"]);
    assert_eq!(result.latest_applied_version.as_deref(), Some("20"));
}

#[test]
fn test_pending_and_invalid_are_mutually_exclusive() {
    let local = vec![m("1"), with_description("2", "x"), m("4"), m("5"), m("6")];
    let remote = vec![m("2"), m("3"), m("5")];

    let result = analyze(&local, &remote);

    for pending in &result.pending {
        assert!(
            !result.invalid.iter().any(|i| i.version == pending.version),
            "{} is both pending and invalid",
            pending.version
        );
    }
    let mut seen: Vec<&str> = result.invalid.iter().map(|i| i.version.as_str()).collect();
    seen.dedup();
    assert_eq!(seen.len(), result.invalid.len());
    assert_eq!(versions(&result.pending), vec!["6"]);
}

#[test]
fn test_version_equal_to_latest_under_order_is_pending() {
    // `1.2.0` is order-equal to the applied `1.2` but a distinct identity: it
    // is not below the latest version, so it is pending rather than missed.
    let local = vec![m("1.2"), m("1.2.0")];
    let remote = vec![m("1.2")];

    let result = analyze(&local, &remote);

    assert!(result.invalid.is_empty());
    assert_eq!(versions(&result.pending), vec!["1.2.0"]);
}

#[test]
fn test_pending_keeps_local_items() {
    #[derive(Debug, Clone, PartialEq)]
    struct Local(MigrationDescriptor, &'static str);

    impl AsRef<MigrationDescriptor> for Local {
        fn as_ref(&self) -> &MigrationDescriptor {
            &self.0
        }
    }

    let local = vec![Local(m("1"), "first"), Local(m("2"), "second")];
    let remote = vec![m("1")];

    let result = analyze(&local, &remote);

    assert_eq!(result.pending, vec![Local(m("2"), "second")]);
}
