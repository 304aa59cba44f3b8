//! Pre-migration validation of the legacy dataset.
//!
//! Checks run in a fixed order before any DDL or DML executes: target-table
//! existence (the idempotency guard), enrichment-status enumeration,
//! execution-status enumeration, and identifier presence. The captured
//! [`Baseline`] is the oracle the post-migration verifier checks against.

use crate::migration::error::{MigrationError, ValidationReport, ValidationViolation};
use crate::task::adapters::sqlite::ddl;
use crate::task::domain::{EnrichmentStatus, TodoStatus};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;
use tracing::info;

/// Row counts captured before the migration mutates anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    /// Total legacy records.
    pub tasks: i64,
    /// Records with a non-null enrichment status.
    pub with_enrichment: i64,
    /// Records with a non-null execution status.
    pub with_execution: i64,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct OffendingRow {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Nullable<Text>)]
    value: Option<String>,
}

/// Validates the legacy dataset and captures the baseline counts.
///
/// # Errors
///
/// Returns [`MigrationError::AlreadyApplied`] when a target table already
/// exists, [`MigrationError::Validation`] with every violation found when
/// the dataset is unfit, or [`MigrationError::Persistence`] on query
/// failure.
pub fn check(conn: &mut SqliteConnection) -> Result<Baseline, MigrationError> {
    for table in ["workbench", "todos"] {
        if table_exists(conn, table)? {
            return Err(MigrationError::AlreadyApplied {
                table: table.to_owned(),
            });
        }
    }
    info!(check = "target_tables_absent", "passed");

    let mut violations = Vec::new();

    if table_exists(conn, "tasks")? {
        if !has_legacy_columns(conn)? {
            violations.push(ValidationViolation::MissingLegacyColumns);
        }
    } else {
        violations.push(ValidationViolation::MissingLegacyTable);
    }

    if !violations.is_empty() {
        // Without a legacy-shaped table the remaining checks cannot run.
        return Err(MigrationError::Validation(ValidationReport { violations }));
    }
    info!(check = "legacy_table_shape", "passed");

    collect_invalid_statuses(
        conn,
        "enrichment_status",
        &EnrichmentStatus::ALL.map(EnrichmentStatus::as_str),
        &mut violations,
        |task_id, value| ValidationViolation::InvalidEnrichmentStatus { task_id, value },
    )?;
    info!(
        check = "enrichment_status_enum",
        violations = violations.len(),
        "checked"
    );

    let before = violations.len();
    collect_invalid_statuses(
        conn,
        "status",
        &TodoStatus::ALL.map(TodoStatus::as_str),
        &mut violations,
        |task_id, value| ValidationViolation::InvalidExecutionStatus { task_id, value },
    )?;
    info!(
        check = "execution_status_enum",
        violations = violations.len() - before,
        "checked"
    );

    let empty_ids = scalar_count(
        conn,
        "SELECT COUNT(*) AS count FROM tasks WHERE id IS NULL OR id = ''",
    )?;
    if empty_ids > 0 {
        violations.push(ValidationViolation::MissingIdentifier { count: empty_ids });
    }
    info!(check = "identifiers_present", violations = empty_ids, "checked");

    if !violations.is_empty() {
        return Err(MigrationError::Validation(ValidationReport { violations }));
    }

    let baseline = Baseline {
        tasks: scalar_count(conn, "SELECT COUNT(*) AS count FROM tasks")?,
        with_enrichment: scalar_count(
            conn,
            "SELECT COUNT(*) AS count FROM tasks WHERE enrichment_status IS NOT NULL",
        )?,
        with_execution: scalar_count(
            conn,
            "SELECT COUNT(*) AS count FROM tasks WHERE status IS NOT NULL",
        )?,
    };
    info!(
        tasks = baseline.tasks,
        with_enrichment = baseline.with_enrichment,
        with_execution = baseline.with_execution,
        "baseline captured"
    );
    Ok(baseline)
}

/// Returns whether a table with the given name exists.
pub(crate) fn table_exists(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<bool, MigrationError> {
    let row: CountRow = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind::<Text, _>(name)
    .get_result(conn)?;
    Ok(row.count > 0)
}

/// Workflow columns the mapper consumes; everything else the migration
/// touches comes from [`ddl::CONTENT_COLUMNS`].
const LEGACY_WORKFLOW_COLUMNS: [&str; 4] = [
    "enrichment_status",
    "status",
    "error_message",
    "metadata_suggestions",
];

fn has_legacy_columns(conn: &mut SqliteConnection) -> Result<bool, MigrationError> {
    let quoted: Vec<String> = ddl::CONTENT_COLUMNS
        .iter()
        .chain(LEGACY_WORKFLOW_COLUMNS.iter())
        .map(|name| format!("'{name}'"))
        .collect();
    let sql = format!(
        "SELECT COUNT(*) AS count FROM pragma_table_info('tasks') WHERE name IN ({})",
        quoted.join(", ")
    );
    let row: CountRow = diesel::sql_query(sql).get_result(conn)?;
    Ok(usize::try_from(row.count).is_ok_and(|found| found == quoted.len()))
}

fn scalar_count(conn: &mut SqliteConnection, sql: &str) -> Result<i64, MigrationError> {
    let row: CountRow = diesel::sql_query(sql).get_result(conn)?;
    Ok(row.count)
}

fn collect_invalid_statuses(
    conn: &mut SqliteConnection,
    column: &str,
    valid: &[&str],
    violations: &mut Vec<ValidationViolation>,
    make_violation: impl Fn(String, String) -> ValidationViolation,
) -> Result<(), MigrationError> {
    let quoted: Vec<String> = valid.iter().map(|value| format!("'{value}'")).collect();
    let sql = format!(
        "SELECT id, {column} AS value FROM tasks \
         WHERE {column} IS NOT NULL AND {column} NOT IN ({}) \
         ORDER BY id",
        quoted.join(", ")
    );
    let rows: Vec<OffendingRow> = diesel::sql_query(sql).load(conn)?;
    for row in rows {
        violations.push(make_violation(row.id, row.value.unwrap_or_default()));
    }
    Ok(())
}
