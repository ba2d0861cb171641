use super::*;
use crate::error::ActionError;
use crate::migration::MigrationAction;
use async_trait::async_trait;
use nm_core::InvalidCause;
use nm_db::test_utils::{Event, ScriptedDatabase};
use nm_db::Query;
use nm_ledger::test_utils::MemoryLedger;
use std::sync::Mutex;

fn script(version: &str, statements: &[&str]) -> Migration {
    Migration::script(
        version,
        format!("migration {}", version),
        Some(format!("V{}__migration.cypher", version)),
        statements.iter().map(|s| s.to_string()).collect(),
    )
}

fn executor(
    db: &ScriptedDatabase,
    ledger: &Arc<MemoryLedger>,
    migrations: Vec<Migration>,
    database: Option<&str>,
) -> Executor {
    Executor::new(
        Arc::new(db.clone()),
        Arc::clone(ledger) as Arc<dyn Ledger>,
        migrations,
        database.map(String::from),
    )
}

fn begins(db: &ScriptedDatabase) -> usize {
    db.events()
        .iter()
        .filter(|e| matches!(e, Event::Begin { .. }))
        .count()
}

fn versions(report: &MigrationReport) -> Vec<&str> {
    report
        .applied
        .iter()
        .map(|m| m.descriptor.version.as_str())
        .collect()
}

#[tokio::test]
async fn test_first_run_creates_anchor_and_applies_in_order() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(
        &db,
        &ledger,
        vec![script("10", &["CREATE (:C)"]), script("2", &["CREATE (:B)"])],
        None,
    );

    let report = exec.migrate().await.unwrap();

    assert_eq!(versions(&report), vec!["2", "10"]);
    assert_eq!(report.previous_version, None);
    assert_eq!(report.current_version(), Some("10"));
    assert_eq!(ledger.anchor_calls(), 1);
    assert_eq!(ledger.constraint_calls(), 1);
    let appended: Vec<String> = ledger.appended().into_iter().map(|d| d.version).collect();
    assert_eq!(appended, vec!["2", "10"]);
    assert_eq!(
        db.queries(),
        vec!["CREATE (:B)", "LEDGER APPEND 2", "CREATE (:C)", "LEDGER APPEND 10"]
    );
    assert_eq!(db.committed().len(), 4);
}

#[tokio::test]
async fn test_existing_chain_applies_only_pending() {
    let db = ScriptedDatabase::new();
    let first = script("1", &["CREATE (:A)"]);
    let ledger = Arc::new(MemoryLedger::with_chain(vec![first.descriptor.clone()]));
    let exec = executor(&db, &ledger, vec![first, script("2", &["CREATE (:B)"])], None);

    let report = exec.migrate().await.unwrap();

    assert_eq!(versions(&report), vec!["2"]);
    assert_eq!(report.previous_version.as_deref(), Some("1"));
    assert_eq!(ledger.anchor_calls(), 0);
    assert_eq!(ledger.constraint_calls(), 0);
    assert_eq!(db.count_matching("CREATE (:A)"), 0);
}

#[tokio::test]
async fn test_up_to_date_touches_nothing() {
    let db = ScriptedDatabase::new();
    let first = script("1", &["CREATE (:A)"]);
    let ledger = Arc::new(MemoryLedger::with_chain(vec![first.descriptor.clone()]));
    let exec = executor(&db, &ledger, vec![first], None);

    let report = exec.migrate().await.unwrap();

    assert!(report.applied.is_empty());
    assert_eq!(report.current_version(), Some("1"));
    assert_eq!(begins(&db), 0);
    assert!(ledger.appended().is_empty());
}

#[tokio::test]
async fn test_invalid_analysis_applies_nothing() {
    let db = ScriptedDatabase::new();
    let applied = script("1", &["CREATE (:A)"]);
    let ledger = Arc::new(MemoryLedger::with_chain(vec![applied.descriptor.clone()]));
    let edited = script("1", &["CREATE (:A {edited: true})"]);
    let exec = executor(&db, &ledger, vec![edited, script("2", &["CREATE (:B)"])], None);

    let err = exec.migrate().await.unwrap_err();

    match err {
        MigrateError::Validation { invalid } => {
            assert_eq!(invalid, vec![nm_core::InvalidVersion::new("1", InvalidCause::Different)]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ledger.appended().is_empty());
    assert_eq!(begins(&db), 0);
    assert_eq!(ledger.anchor_calls(), 0);
}

#[tokio::test]
async fn test_validation_error_lists_every_invalid_version() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::with_chain(vec![
        script("1", &["CREATE (:A)"]).descriptor,
        script("3", &["CREATE (:C)"]).descriptor,
    ]));
    let exec = executor(
        &db,
        &ledger,
        vec![script("1", &["CREATE (:Changed)"]), script("2", &["CREATE (:B)"])],
        None,
    );

    let err = exec.migrate().await.unwrap_err();
    let message = err.to_string();

    assert!(message.starts_with("[M004]"));
    assert!(message.contains("V1 DIFFERENT"));
    assert!(message.contains("V2 MISSED_REMOTELY"));
    assert!(message.contains("V3 MISSED_LOCALLY"));
}

#[tokio::test]
async fn test_body_failure_rolls_back_and_halts() {
    let db = ScriptedDatabase::new();
    db.fail_on("CREATE (:B)");
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(
        &db,
        &ledger,
        vec![
            script("1", &["CREATE (:A)"]),
            script("2", &["CREATE (:Before)", "CREATE (:B)"]),
            script("3", &["CREATE (:C)"]),
        ],
        None,
    );

    let err = exec.migrate().await.unwrap_err();

    assert!(matches!(
        &err,
        MigrateError::Apply { version, stage: ApplyStage::Body, .. } if version == "2"
    ));
    assert_eq!(db.count_committed("CREATE (:A)"), 1);
    assert_eq!(db.count_committed("LEDGER APPEND 1"), 1);
    assert_eq!(db.count_committed("CREATE (:Before)"), 0);
    assert_eq!(db.count_matching("LEDGER APPEND 2"), 0);
    assert_eq!(db.count_matching("CREATE (:C)"), 0);
    assert_eq!(db.events().last(), Some(&Event::Rollback { database: None }));
}

#[tokio::test]
async fn test_record_failure_rolls_back_body() {
    let db = ScriptedDatabase::new();
    db.fail_on("LEDGER APPEND 1");
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"])], None);

    let err = exec.migrate().await.unwrap_err();

    assert!(matches!(
        &err,
        MigrateError::Apply { stage: ApplyStage::Record, .. }
    ));
    assert!(db.committed().is_empty());
}

#[tokio::test]
async fn test_commit_failure_is_reported() {
    let db = ScriptedDatabase::new();
    db.fail_commits();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(
        &db,
        &ledger,
        vec![script("1", &["CREATE (:A)"]), script("2", &["CREATE (:B)"])],
        None,
    );

    let err = exec.migrate().await.unwrap_err();

    assert!(matches!(
        &err,
        MigrateError::Apply { version, stage: ApplyStage::Commit, .. } if version == "1"
    ));
    assert!(db.committed().is_empty());
    assert_eq!(db.count_matching("CREATE (:B)"), 0);
}

#[tokio::test]
async fn test_observer_runs_after_each_commit() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(
        &db,
        &ledger,
        vec![script("1", &["CREATE (:A)"]), script("2", &["CREATE (:B)"])],
        None,
    );

    let seen = Mutex::new(Vec::new());
    let observer_db = db.clone();
    exec.migrate_with(|applied| {
        let marker = format!("LEDGER APPEND {}", applied.descriptor.version);
        assert_eq!(observer_db.count_committed(&marker), 1);
        seen.lock().unwrap().push(applied.descriptor.version.clone());
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(seen.into_inner().unwrap(), vec!["1", "2"]);
}

#[tokio::test]
async fn test_observer_failure_halts_after_commit() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(
        &db,
        &ledger,
        vec![script("1", &["CREATE (:A)"]), script("2", &["CREATE (:B)"])],
        None,
    );

    let err = exec
        .migrate_with(|_| Err("stdout closed".into()))
        .await
        .unwrap_err();

    assert!(matches!(&err, MigrateError::Observer { version, .. } if version == "1"));
    assert!(err.to_string().contains("committed"));
    assert_eq!(db.count_committed("LEDGER APPEND 1"), 1);
    assert_eq!(db.count_matching("CREATE (:B)"), 0);
}

#[tokio::test]
async fn test_cross_database_ledger_uses_two_transactions() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new().on_database("schema"));
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"])], Some("movies"));

    exec.migrate().await.unwrap();

    let movies = Some("movies".to_string());
    let schema = Some("schema".to_string());
    assert_eq!(
        db.events(),
        vec![
            Event::Begin {
                database: movies.clone()
            },
            Event::Begin {
                database: schema.clone()
            },
            Event::Run {
                database: movies.clone(),
                query: Query::new("CREATE (:A)"),
                in_transaction: true,
            },
            Event::Run {
                database: schema.clone(),
                query: Query::new("LEDGER APPEND 1"),
                in_transaction: true,
            },
            Event::Commit { database: movies },
            Event::Commit { database: schema },
        ]
    );
}

#[tokio::test]
async fn test_cross_database_failure_rolls_back_both() {
    let db = ScriptedDatabase::new();
    db.fail_on("LEDGER APPEND 1");
    let ledger = Arc::new(MemoryLedger::new().on_database("schema"));
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"])], Some("movies"));

    exec.migrate().await.unwrap_err();

    let rollbacks = db
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Rollback { .. }))
        .count();
    assert_eq!(rollbacks, 2);
    assert!(db.committed().is_empty());
}

#[tokio::test]
async fn test_same_database_uses_one_transaction() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new().on_database("movies"));
    let exec = executor(
        &db,
        &ledger,
        vec![script("1", &["CREATE (:A)"]), script("2", &["CREATE (:B)"])],
        Some("movies"),
    );

    exec.migrate().await.unwrap();

    assert_eq!(begins(&db), 2);
}

struct TagMovies;

#[async_trait]
impl MigrationAction for TagMovies {
    async fn up(&self, tx: &mut dyn Transaction) -> Result<(), ActionError> {
        tx.run(&Query::new("MATCH (m:Movie) SET m.tagged = true")).await?;
        Ok(())
    }
}

#[tokio::test]
async fn test_action_runs_in_migration_transaction() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let action = Migration::action("2", "tag", Some("TagMovies".to_string()), Arc::new(TagMovies));
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"]), action], None);

    let report = exec.migrate().await.unwrap();

    assert_eq!(versions(&report), vec!["1", "2"]);
    assert_eq!(db.count_committed("SET m.tagged = true"), 1);
    assert_eq!(ledger.appended()[1].checksum, None);
}

#[tokio::test]
async fn test_analyze_is_read_only() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"])], None);

    let analysis = exec.analyze().await.unwrap();

    assert_eq!(analysis.pending.len(), 1);
    assert_eq!(analysis.latest_applied_version, None);
    assert_eq!(ledger.read_calls(), 1);
    assert_eq!(ledger.anchor_calls(), 0);
    assert!(db.events().is_empty());
}

#[test]
fn test_from_settings_requires_path() {
    let db = ScriptedDatabase::new();
    let settings = Settings::default();

    let err = Executor::from_settings(Arc::new(db), &settings, &ActionRegistry::new())
        .err()
        .unwrap();
    assert!(matches!(err, MigrateError::Core(_)));
}

#[test]
fn test_from_settings_binds_scope_and_databases() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("V1__init.cypher"), "CREATE (:A);").unwrap();
    let settings = Settings {
        path: Some(dir.path().to_path_buf()),
        project: Some("catalog".to_string()),
        database: Some("movies".to_string()),
        ..Settings::default()
    };

    let exec = Executor::from_settings(
        Arc::new(ScriptedDatabase::new()),
        &settings,
        &ActionRegistry::new(),
    )
    .unwrap();

    assert_eq!(exec.migrations().len(), 1);
    assert_eq!(exec.ledger().database(), Some("movies"));
    assert_eq!(exec.ledger().scope().project(), Some("catalog"));
    assert_eq!(exec.ledger().scope().target(), None);
}

#[tokio::test]
async fn test_ledger_on_default_database_gets_its_own_transaction() {
    let db = ScriptedDatabase::new();
    let ledger = Arc::new(MemoryLedger::new());
    let exec = executor(&db, &ledger, vec![script("1", &["CREATE (:A)"])], Some("movies"));

    exec.migrate().await.unwrap();

    assert_eq!(begins(&db), 2);
    assert_eq!(ledger.appended().len(), 1);
    assert!(db.events().contains(&Event::Run {
        database: None,
        query: Query::new("LEDGER APPEND 1"),
        in_transaction: true,
    }));
}
