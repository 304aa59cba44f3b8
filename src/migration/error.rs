//! Error taxonomy for the schema decomposition migration.
//!
//! Three failure classes are kept distinguishable for the operator: a
//! repeat run (`AlreadyApplied`), bad source data (`Validation`, nothing was
//! changed), and a defect detected after the transformation (`Verification`,
//! the transaction rolled back).

use std::fmt;
use thiserror::Error;

/// Errors returned by the migration engine.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The target tables already exist; the migration ran before.
    #[error(
        "migration already applied: table '{table}' already exists; \
         restore from backup if a previous run is suspected corrupt"
    )]
    AlreadyApplied {
        /// The target table whose existence triggered the check.
        table: String,
    },

    /// The legacy dataset failed pre-flight validation; nothing was changed.
    #[error("pre-migration validation failed: {0}")]
    Validation(ValidationReport),

    /// A post-condition did not hold; the transaction was rolled back.
    #[error("post-migration verification failed: {0}")]
    Verification(VerificationFailure),

    /// Underlying datastore failure; the transaction was rolled back.
    #[error("persistence error: {0}")]
    Persistence(#[from] diesel::result::Error),
}

/// One pre-flight violation found in the legacy dataset.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationViolation {
    /// The legacy `tasks` table does not exist.
    #[error("legacy 'tasks' table not found")]
    MissingLegacyTable,

    /// The `tasks` table does not carry every column of the legacy
    /// single-table shape, yet no target tables exist either; the datastore
    /// is at some other schema revision.
    #[error("'tasks' table is missing columns of the legacy single-table shape")]
    MissingLegacyColumns,

    /// An enrichment status outside the valid enumeration.
    #[error("task {task_id}: invalid enrichment status '{value}'")]
    InvalidEnrichmentStatus {
        /// Offending task key.
        task_id: String,
        /// The out-of-enumeration value.
        value: String,
    },

    /// An execution status outside the valid enumeration.
    #[error("task {task_id}: invalid execution status '{value}'")]
    InvalidExecutionStatus {
        /// Offending task key.
        task_id: String,
        /// The out-of-enumeration value.
        value: String,
    },

    /// Records with a NULL or empty identifier.
    #[error("{count} record(s) with a null or empty identifier")]
    MissingIdentifier {
        /// Number of offending records.
        count: i64,
    },
}

/// All pre-flight violations found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Violations in check order.
    pub violations: Vec<ValidationViolation>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in &self.violations {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
            first = false;
        }
        Ok(())
    }
}

/// One post-condition that did not hold after the transformation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The task count changed across the migration.
    #[error("task count changed: {baseline} before, {actual} after")]
    TaskCountChanged {
        /// Count captured by the validator.
        baseline: i64,
        /// Count found after the transformation.
        actual: i64,
    },

    /// Workbench rows do not match the baseline enrichment-state count.
    #[error("workbench row count {actual} != baseline enrichment-state count {expected}")]
    WorkbenchCountMismatch {
        /// Baseline count of records with enrichment state.
        expected: i64,
        /// Workbench rows found.
        actual: i64,
    },

    /// Todo rows do not match the baseline execution-state count.
    #[error("todo row count {actual} != baseline execution-state count {expected}")]
    TodoCountMismatch {
        /// Baseline count of records with execution state.
        expected: i64,
        /// Todo rows found.
        actual: i64,
    },

    /// Workbench rows referencing no task.
    #[error("{count} orphaned workbench row(s)")]
    OrphanedWorkbenchRows {
        /// Orphan count.
        count: i64,
    },

    /// Todo rows referencing no task.
    #[error("{count} orphaned todo row(s)")]
    OrphanedTodoRows {
        /// Orphan count.
        count: i64,
    },

    /// Tasks with more than one workbench row.
    #[error("{count} task(s) with duplicate workbench rows")]
    DuplicateWorkbenchTask {
        /// Duplicated task count.
        count: i64,
    },

    /// Tasks with more than one todo row.
    #[error("{count} task(s) with duplicate todo rows")]
    DuplicateTodoTask {
        /// Duplicated task count.
        count: i64,
    },

    /// Positions shared by more than one todo row.
    #[error("{count} duplicated todo position value(s)")]
    DuplicateTodoPosition {
        /// Duplicated position count.
        count: i64,
    },
}
