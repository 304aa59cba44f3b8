//! Single-table to three-table schema decomposition migration.
//!
//! The legacy schema kept immutable task content and two independent,
//! transient workflow states in one mutable `tasks` table. The engine here
//! splits it into the three lifecycle-scoped tables (`tasks`, `workbench`,
//! `todos`) inside exactly one transaction: validate, transform, verify,
//! commit. A failure at any point rolls the datastore back to its exact
//! pre-migration state.
//!
//! Sequencing note: the legacy table is renamed aside *before* the target
//! tables are created, so the foreign keys on `workbench` and `todos` always
//! reference the rebuilt `tasks` table and no `DROP TABLE` ever runs against
//! a table with enforced children.
//!
//! There is no reverse migration. Recovery from corruption discovered after
//! commit is restoring the snapshot taken before the run.

pub mod error;
pub mod legacy;
pub mod mapper;
pub mod validator;
pub mod verifier;

#[cfg(test)]
mod tests;

pub use error::{MigrationError, ValidationReport, ValidationViolation, VerificationFailure};
pub use validator::Baseline;
pub use verifier::VerificationSummary;

use crate::task::adapters::sqlite::ddl;
use crate::task::adapters::sqlite::models::{NewTodoRow, NewWorkbenchRow};
use crate::task::adapters::sqlite::schema::{todos, workbench};
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use mapper::{TodoSeed, WorkbenchSeed};
use mockable::Clock;
use tracing::info;

/// Rows per batched `INSERT`, kept well under the `SQLite` bind limit.
const INSERT_CHUNK: usize = 200;

/// Outcome of a successful migration, for operator reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    /// Counts captured before any change.
    pub baseline: Baseline,
    /// Counts observed after verification.
    pub summary: VerificationSummary,
    /// Records that produced both a workbench and a todo row.
    pub graduated: usize,
}

/// Runs the schema decomposition migration in one transaction.
///
/// Designed as a single, blocking, operator-invoked unit of work under a
/// maintenance-window assumption; concurrent writers are out of contract.
///
/// # Errors
///
/// Returns [`MigrationError::AlreadyApplied`] when the target tables exist,
/// [`MigrationError::Validation`] when the legacy dataset is unfit (nothing
/// changed), [`MigrationError::Verification`] when a post-condition fails
/// (transaction rolled back), or [`MigrationError::Persistence`] on any
/// datastore failure (transaction rolled back).
pub fn run(
    conn: &mut SqliteConnection,
    clock: &impl Clock,
) -> Result<MigrationReport, MigrationError> {
    let now = clock.utc();
    conn.transaction(|transaction_conn| execute(transaction_conn, now))
}

fn execute(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> Result<MigrationReport, MigrationError> {
    let baseline = validator::check(conn)?;

    let records = legacy::load_legacy_records(conn)?;
    let mapped = mapper::map_dataset(&records, now);
    info!(
        records = records.len(),
        workbench_rows = mapped.workbench.len(),
        todo_rows = mapped.todos.len(),
        graduated = mapped.graduated(),
        "legacy dataset mapped"
    );

    conn.batch_execute("ALTER TABLE tasks RENAME TO tasks_legacy")?;
    conn.batch_execute(ddl::CREATE_TASKS)?;
    conn.batch_execute(ddl::CREATE_WORKBENCH)?;
    conn.batch_execute(ddl::CREATE_TODOS)?;
    info!("target tables created");

    let copy_sql = format!(
        "INSERT INTO tasks ({columns}) SELECT {columns} FROM tasks_legacy",
        columns = ddl::CONTENT_COLUMNS.join(", ")
    );
    conn.batch_execute(&copy_sql)?;

    let workbench_rows: Vec<NewWorkbenchRow> =
        mapped.workbench.iter().map(workbench_row).collect();
    for chunk in workbench_rows.chunks(INSERT_CHUNK) {
        diesel::insert_into(workbench::table)
            .values(chunk)
            .execute(conn)?;
    }

    let todo_rows: Vec<NewTodoRow> = mapped.todos.iter().map(todo_row).collect();
    for chunk in todo_rows.chunks(INSERT_CHUNK) {
        diesel::insert_into(todos::table)
            .values(chunk)
            .execute(conn)?;
    }
    info!(
        workbench_rows = workbench_rows.len(),
        todo_rows = todo_rows.len(),
        "target rows inserted"
    );

    conn.batch_execute("DROP TABLE tasks_legacy")?;
    conn.batch_execute(ddl::CREATE_INDEXES)?;
    info!("legacy table dropped, indexes created");

    let summary = verifier::check(conn, &baseline)?;

    Ok(MigrationReport {
        baseline,
        summary,
        graduated: mapped.graduated(),
    })
}

fn workbench_row(seed: &WorkbenchSeed) -> NewWorkbenchRow {
    NewWorkbenchRow {
        id: seed.id.as_str().to_owned(),
        task_id: seed.task_id.as_str().to_owned(),
        enrichment_status: seed.status.as_str().to_owned(),
        error_message: seed.error_message.clone(),
        metadata_suggestions: seed.metadata_suggestions.clone(),
        moved_to_todos_at: seed.graduated_at,
        created_at: seed.created_at,
        updated_at: seed.updated_at,
    }
}

fn todo_row(seed: &TodoSeed) -> NewTodoRow {
    NewTodoRow {
        id: seed.id.as_str().to_owned(),
        task_id: seed.task_id.as_str().to_owned(),
        status: seed.status.as_str().to_owned(),
        position: seed.position,
        created_at: seed.created_at,
        updated_at: seed.updated_at,
    }
}
