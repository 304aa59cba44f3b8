//! Materialized view of the legacy single-table dataset.
//!
//! The legacy table only exists before the migration runs, so it has no
//! Diesel schema; rows are loaded with raw SQL into [`LegacyTaskRow`] and
//! lifted into the domain [`LegacyTaskRecord`] shape the mapper consumes.
//! The load is fully materialized and deterministically sorted before any
//! row is written, as position ranking requires.

use crate::migration::error::{MigrationError, ValidationReport, ValidationViolation};
use crate::task::domain::{EnrichmentStatus, LegacyTaskRecord, TaskId, TodoStatus};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text, TimestamptzSqlite};
use diesel::sqlite::SqliteConnection;

/// Raw legacy row, restricted to the columns the mapper consumes.
#[derive(Debug, QueryableByName)]
pub struct LegacyTaskRow {
    /// Opaque task key.
    #[diesel(sql_type = Text)]
    pub id: String,
    /// Enrichment status string, if any.
    #[diesel(sql_type = Nullable<Text>)]
    pub enrichment_status: Option<String>,
    /// Enrichment failure detail.
    #[diesel(sql_type = Nullable<Text>)]
    pub error_message: Option<String>,
    /// Execution status string, if any.
    #[diesel(sql_type = Nullable<Text>)]
    pub status: Option<String>,
    /// Extraction-suggestion JSON, carried verbatim.
    #[diesel(sql_type = Nullable<Text>)]
    pub metadata_suggestions: Option<String>,
    /// Original creation timestamp.
    #[diesel(sql_type = TimestamptzSqlite)]
    pub created_at: DateTime<Utc>,
}

/// Loads every legacy record, sorted by `(created_at, id)`.
///
/// # Errors
///
/// Returns [`MigrationError::Persistence`] when the query fails, or
/// [`MigrationError::Validation`] when a status value does not parse. The
/// validator has already rejected such values at this point, so a parse
/// failure here indicates the dataset changed mid-migration.
pub fn load_legacy_records(
    conn: &mut SqliteConnection,
) -> Result<Vec<LegacyTaskRecord>, MigrationError> {
    let rows: Vec<LegacyTaskRow> = diesel::sql_query(
        "SELECT id, enrichment_status, error_message, status, metadata_suggestions, created_at \
         FROM tasks ORDER BY created_at ASC, id ASC",
    )
    .load(conn)?;

    rows.into_iter().map(lift_row).collect()
}

fn lift_row(row: LegacyTaskRow) -> Result<LegacyTaskRecord, MigrationError> {
    let id = TaskId::new(row.id.clone()).map_err(|_| {
        single_violation(ValidationViolation::MissingIdentifier { count: 1 })
    })?;
    let enrichment_status = row
        .enrichment_status
        .as_deref()
        .map(EnrichmentStatus::try_from)
        .transpose()
        .map_err(|err| {
            single_violation(ValidationViolation::InvalidEnrichmentStatus {
                task_id: row.id.clone(),
                value: err.0,
            })
        })?;
    let execution_status = row
        .status
        .as_deref()
        .map(TodoStatus::try_from)
        .transpose()
        .map_err(|err| {
            single_violation(ValidationViolation::InvalidExecutionStatus {
                task_id: row.id.clone(),
                value: err.0,
            })
        })?;

    Ok(LegacyTaskRecord {
        id,
        enrichment_status,
        error_message: row.error_message,
        execution_status,
        metadata_suggestions: row.metadata_suggestions,
        created_at: row.created_at,
    })
}

fn single_violation(violation: ValidationViolation) -> MigrationError {
    MigrationError::Validation(ValidationReport {
        violations: vec![violation],
    })
}
