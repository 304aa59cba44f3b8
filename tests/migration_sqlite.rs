//! End-to-end tests for the single-table to three-table schema migration.
//!
//! Each test builds a real legacy database in a temporary file, runs the
//! migration through the public entry point, and inspects the resulting
//! tables with raw SQL.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]

mod test_helpers;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use eyre::Result;
use mockable::DefaultClock;
use std::sync::Arc;
use taskdeck::migration::{self, MigrationError, ValidationViolation};
use taskdeck::task::adapters::sqlite::{self, SqliteTaskStore};
use taskdeck::task::domain::{EnrichmentStatus, Lane, TaskId, TodoStatus};
use taskdeck::task::ports::TaskStore;
use tempfile::TempDir;
use test_helpers::{
    LEGACY_DDL, LEGACY_DDL_NO_PK, LegacySeed, at, scalar_count, table_exists, temp_database,
    todo_rows, workbench_rows,
};

const SUGGESTION_JSON: &str = r#"{"project":{"value":"home","confidence":0.9}}"#;

fn legacy_database(ddl: &str) -> Result<(TempDir, String, SqliteConnection)> {
    let (guard, url) = temp_database();
    let mut conn = sqlite::connect(&url)?;
    conn.batch_execute(ddl)?;
    Ok((guard, url, conn))
}

fn seed_mixed_dataset(conn: &mut SqliteConnection) -> Result<()> {
    LegacySeed::new("a", at(0)).enrichment("pending").insert(conn)?;
    LegacySeed::new("b", at(1))
        .enrichment("completed")
        .execution("open")
        .suggestions(SUGGESTION_JSON)
        .insert(conn)?;
    LegacySeed::new("c", at(2)).execution("completed").insert(conn)?;
    LegacySeed::new("d", at(3))
        .enrichment("failed")
        .error("model timeout")
        .insert(conn)?;
    LegacySeed::new("e", at(4)).insert(conn)?;
    Ok(())
}

#[test]
fn migrate_routes_each_workflow_state_to_its_table() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    seed_mixed_dataset(&mut conn)?;

    let report = migration::run(&mut conn, &DefaultClock)?;

    assert_eq!(report.baseline.tasks, 5);
    assert_eq!(report.baseline.with_enrichment, 3);
    assert_eq!(report.baseline.with_execution, 2);
    assert_eq!(report.summary.tasks, 5);
    assert_eq!(report.summary.workbench, 3);
    assert_eq!(report.summary.todos, 2);
    assert_eq!(report.graduated, 1);

    assert!(!table_exists(&mut conn, "tasks_legacy")?);
    assert_eq!(
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM tasks")?,
        5
    );

    let workbench = workbench_rows(&mut conn)?;
    assert_eq!(workbench.len(), 3);
    assert_eq!(workbench[0].task_id, "a");
    assert_eq!(workbench[0].enrichment_status, "pending");
    assert_eq!(workbench[0].moved_to_todos_at, None);
    assert_eq!(workbench[1].task_id, "b");
    assert_eq!(
        workbench[1].metadata_suggestions.as_deref(),
        Some(SUGGESTION_JSON)
    );
    assert!(workbench[1].moved_to_todos_at.is_some());
    assert_eq!(workbench[2].task_id, "d");
    assert_eq!(workbench[2].enrichment_status, "failed");
    assert_eq!(workbench[2].error_message.as_deref(), Some("model timeout"));

    let todos = todo_rows(&mut conn)?;
    assert_eq!(todos.len(), 2);
    assert_eq!((todos[0].task_id.as_str(), todos[0].position), ("b", 1));
    assert_eq!(todos[0].status, "open");
    assert_eq!((todos[1].task_id.as_str(), todos[1].position), ("c", 2));
    assert_eq!(todos[1].status, "completed");
    Ok(())
}

#[test]
fn positions_follow_creation_order_not_insertion_order() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    LegacySeed::new("c", at(2)).execution("open").insert(&mut conn)?;
    LegacySeed::new("a", at(0)).execution("open").insert(&mut conn)?;
    LegacySeed::new("b", at(1)).execution("open").insert(&mut conn)?;

    migration::run(&mut conn, &DefaultClock)?;

    let todos = todo_rows(&mut conn)?;
    let ranked: Vec<(&str, i32)> = todos
        .iter()
        .map(|row| (row.task_id.as_str(), row.position))
        .collect();
    assert_eq!(ranked, vec![("a", 1), ("b", 2), ("c", 3)]);
    Ok(())
}

#[test]
fn rejects_out_of_enumeration_status_without_changing_anything() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    LegacySeed::new("a", at(0)).enrichment("enriching").insert(&mut conn)?;

    let err = migration::run(&mut conn, &DefaultClock).expect_err("invalid status must reject");
    let MigrationError::Validation(report) = err else {
        eyre::bail!("expected a validation rejection, got: {err}");
    };
    assert!(report.violations.contains(
        &ValidationViolation::InvalidEnrichmentStatus {
            task_id: "a".to_owned(),
            value: "enriching".to_owned(),
        }
    ));

    assert!(!table_exists(&mut conn, "workbench")?);
    assert!(!table_exists(&mut conn, "todos")?);
    assert_eq!(
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM tasks")?,
        1
    );
    Ok(())
}

#[test]
fn rejects_records_with_empty_identifiers() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    LegacySeed::new("", at(0)).execution("open").insert(&mut conn)?;

    let err = migration::run(&mut conn, &DefaultClock).expect_err("empty id must reject");
    let MigrationError::Validation(report) = err else {
        eyre::bail!("expected a validation rejection, got: {err}");
    };
    assert!(report
        .violations
        .contains(&ValidationViolation::MissingIdentifier { count: 1 }));
    Ok(())
}

#[test]
fn rejects_legacy_table_at_an_older_schema_revision() -> Result<()> {
    // Workflow columns are present but the metadata columns the content copy
    // reads are not; the validator must reject this before any DDL runs.
    let (_guard, _url, mut conn) = legacy_database(
        "CREATE TABLE tasks (
            id TEXT PRIMARY KEY NOT NULL,
            user_input TEXT NOT NULL,
            enrichment_status TEXT,
            status TEXT,
            error_message TEXT,
            metadata_suggestions TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )?;

    let err = migration::run(&mut conn, &DefaultClock).expect_err("older shape must reject");
    let MigrationError::Validation(report) = err else {
        eyre::bail!("expected a validation rejection, got: {err}");
    };
    assert!(report
        .violations
        .contains(&ValidationViolation::MissingLegacyColumns));

    assert!(!table_exists(&mut conn, "workbench")?);
    assert!(!table_exists(&mut conn, "tasks_legacy")?);
    Ok(())
}

#[test]
fn rejects_database_without_a_legacy_table() -> Result<()> {
    let (_guard, url) = temp_database();
    let mut conn = sqlite::connect(&url)?;

    let err = migration::run(&mut conn, &DefaultClock).expect_err("empty database must reject");
    let MigrationError::Validation(report) = err else {
        eyre::bail!("expected a validation rejection, got: {err}");
    };
    assert!(report
        .violations
        .contains(&ValidationViolation::MissingLegacyTable));
    Ok(())
}

#[test]
fn second_run_is_rejected_as_already_applied() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    seed_mixed_dataset(&mut conn)?;
    migration::run(&mut conn, &DefaultClock)?;

    let before = (
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM tasks")?,
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM workbench")?,
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM todos")?,
    );

    let err = migration::run(&mut conn, &DefaultClock).expect_err("repeat run must reject");
    assert!(matches!(err, MigrationError::AlreadyApplied { .. }));

    let after = (
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM tasks")?,
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM workbench")?,
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM todos")?,
    );
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn mid_transformation_failure_rolls_back_every_change() -> Result<()> {
    // Duplicate keys pass validation (both are non-empty) but violate the
    // rebuilt table's primary key partway through the copy.
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL_NO_PK)?;
    LegacySeed::new("dup", at(0)).execution("open").insert(&mut conn)?;
    LegacySeed::new("dup", at(1)).execution("open").insert(&mut conn)?;

    let err = migration::run(&mut conn, &DefaultClock).expect_err("duplicate keys must fail");
    assert!(matches!(err, MigrationError::Persistence(_)));

    assert!(!table_exists(&mut conn, "workbench")?);
    assert!(!table_exists(&mut conn, "todos")?);
    assert!(!table_exists(&mut conn, "tasks_legacy")?);
    assert_eq!(
        scalar_count(&mut conn, "SELECT COUNT(*) AS count FROM tasks")?,
        2
    );
    assert_eq!(
        scalar_count(
            &mut conn,
            "SELECT COUNT(*) AS count FROM pragma_table_info('tasks') WHERE name = 'status'",
        )?,
        1
    );
    Ok(())
}

#[test]
fn foreign_keys_cascade_after_migration() -> Result<()> {
    let (_guard, _url, mut conn) = legacy_database(LEGACY_DDL)?;
    seed_mixed_dataset(&mut conn)?;
    migration::run(&mut conn, &DefaultClock)?;

    diesel::sql_query("DELETE FROM tasks WHERE id = 'b'").execute(&mut conn)?;

    assert_eq!(
        scalar_count(
            &mut conn,
            "SELECT COUNT(*) AS count FROM workbench WHERE task_id = 'b'",
        )?,
        0
    );
    assert_eq!(
        scalar_count(
            &mut conn,
            "SELECT COUNT(*) AS count FROM todos WHERE task_id = 'b'",
        )?,
        0
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn legacy_view_matches_premigration_records() -> Result<()> {
    let (_guard, url, mut conn) = legacy_database(LEGACY_DDL)?;
    seed_mixed_dataset(&mut conn)?;
    migration::run(&mut conn, &DefaultClock)?;
    drop(conn);

    let pool = sqlite::connect_pool(&url)?;
    let store = SqliteTaskStore::new(pool, Arc::new(DefaultClock));

    let graduated = store
        .fetch(&TaskId::new("b")?)
        .await?
        .expect("task 'b' must survive the migration");
    assert_eq!(graduated.user_input, "captured task b");
    assert_eq!(graduated.enrichment_status, Some(EnrichmentStatus::Completed));
    assert_eq!(graduated.status, Some(TodoStatus::Open));
    assert_eq!(graduated.position, Some(1));
    assert!(graduated.moved_to_todos_at.is_some());
    assert_eq!(graduated.lane(), Lane::Graduated);
    let suggestions = graduated
        .metadata_suggestions
        .expect("suggestions must survive the migration");
    assert!(suggestions.field("project").is_some());

    let untracked = store
        .fetch(&TaskId::new("e")?)
        .await?
        .expect("task 'e' must survive the migration");
    assert_eq!(untracked.enrichment_status, None);
    assert_eq!(untracked.status, None);
    assert_eq!(untracked.lane(), Lane::Untracked);
    Ok(())
}
