//! Post-migration verification against the validator's baseline.
//!
//! Runs inside the migration transaction, after the transformation and
//! before commit. Any failure propagates and rolls the whole transaction
//! back, restoring the pre-migration state.

use crate::migration::error::{MigrationError, VerificationFailure};
use crate::migration::validator::Baseline;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use tracing::info;

/// Row counts observed after the transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationSummary {
    /// Tasks after the migration.
    pub tasks: i64,
    /// Workbench rows written.
    pub workbench: i64,
    /// Todo rows written.
    pub todos: i64,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Verifies the migrated schema against the baseline.
///
/// # Errors
///
/// Returns [`MigrationError::Verification`] on the first post-condition
/// that does not hold, or [`MigrationError::Persistence`] on query failure.
pub fn check(
    conn: &mut SqliteConnection,
    baseline: &Baseline,
) -> Result<VerificationSummary, MigrationError> {
    let tasks = count(conn, "SELECT COUNT(*) AS count FROM tasks")?;
    if tasks != baseline.tasks {
        return Err(MigrationError::Verification(
            VerificationFailure::TaskCountChanged {
                baseline: baseline.tasks,
                actual: tasks,
            },
        ));
    }

    let workbench = count(conn, "SELECT COUNT(*) AS count FROM workbench")?;
    if workbench != baseline.with_enrichment {
        return Err(MigrationError::Verification(
            VerificationFailure::WorkbenchCountMismatch {
                expected: baseline.with_enrichment,
                actual: workbench,
            },
        ));
    }

    let todos = count(conn, "SELECT COUNT(*) AS count FROM todos")?;
    if todos != baseline.with_execution {
        return Err(MigrationError::Verification(
            VerificationFailure::TodoCountMismatch {
                expected: baseline.with_execution,
                actual: todos,
            },
        ));
    }

    let orphaned_workbench = count(
        conn,
        "SELECT COUNT(*) AS count FROM workbench w \
         LEFT JOIN tasks t ON t.id = w.task_id WHERE t.id IS NULL",
    )?;
    if orphaned_workbench > 0 {
        return Err(MigrationError::Verification(
            VerificationFailure::OrphanedWorkbenchRows {
                count: orphaned_workbench,
            },
        ));
    }

    let orphaned_todos = count(
        conn,
        "SELECT COUNT(*) AS count FROM todos d \
         LEFT JOIN tasks t ON t.id = d.task_id WHERE t.id IS NULL",
    )?;
    if orphaned_todos > 0 {
        return Err(MigrationError::Verification(
            VerificationFailure::OrphanedTodoRows {
                count: orphaned_todos,
            },
        ));
    }

    let duplicate_workbench = count(
        conn,
        "SELECT COUNT(*) AS count FROM \
         (SELECT task_id FROM workbench GROUP BY task_id HAVING COUNT(*) > 1)",
    )?;
    if duplicate_workbench > 0 {
        return Err(MigrationError::Verification(
            VerificationFailure::DuplicateWorkbenchTask {
                count: duplicate_workbench,
            },
        ));
    }

    let duplicate_todos = count(
        conn,
        "SELECT COUNT(*) AS count FROM \
         (SELECT task_id FROM todos GROUP BY task_id HAVING COUNT(*) > 1)",
    )?;
    if duplicate_todos > 0 {
        return Err(MigrationError::Verification(
            VerificationFailure::DuplicateTodoTask {
                count: duplicate_todos,
            },
        ));
    }

    let duplicate_positions = count(
        conn,
        "SELECT COUNT(*) AS count FROM \
         (SELECT position FROM todos GROUP BY position HAVING COUNT(*) > 1)",
    )?;
    if duplicate_positions > 0 {
        return Err(MigrationError::Verification(
            VerificationFailure::DuplicateTodoPosition {
                count: duplicate_positions,
            },
        ));
    }

    let summary = VerificationSummary {
        tasks,
        workbench,
        todos,
    };
    info!(
        tasks = summary.tasks,
        workbench = summary.workbench,
        todos = summary.todos,
        "post-migration verification passed"
    );
    Ok(summary)
}

fn count(conn: &mut SqliteConnection, sql: &str) -> Result<i64, MigrationError> {
    let row: CountRow = diesel::sql_query(sql).get_result(conn)?;
    Ok(row.count)
}
