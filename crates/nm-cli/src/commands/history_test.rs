use super::*;
use chrono::{TimeZone, Utc};
use nm_core::MigrationDescriptor;

#[test]
fn test_history_rows() {
    let mut applied = LedgerRecord::bare(MigrationDescriptor::script(
        "1",
        "initial schema",
        Some("V1__initial_schema.cypher".to_string()),
        &["CREATE (:Movie)"],
    ));
    applied.applied_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).single();
    applied.duration_ms = Some(1500);
    applied.migrated_by = Some("alice".to_string());

    let bare = LedgerRecord::bare(MigrationDescriptor::action("2", "backfill", None));

    let rows = history_rows(&[applied, bare]);
    assert_eq!(
        rows[0],
        vec![
            "V1",
            "initial schema",
            "CYPHER",
            "2024-03-01 10:15:30",
            "1.50s",
            "alice",
            "-"
        ]
    );
    assert_eq!(rows[1], vec!["V2", "backfill", "ACTION", "-", "-", "-", "-"]);
}
