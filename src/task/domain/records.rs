//! Read models and legacy record shapes for the task workflow.

use super::{EnrichmentStatus, TaskId, TaskMetadata, TodoStatus};
use crate::task::domain::MetadataSuggestions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow lane a task currently occupies.
///
/// Lanes are derived, never stored: the graduation stamp and the enrichment
/// status together place every task in exactly one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Captured, waiting for the enrichment pipeline to pick it up.
    Queued,
    /// Enrichment is in flight.
    Enriching,
    /// Enriched and ready to graduate to the todo list.
    Ready,
    /// Enrichment failed and needs user attention.
    Failed,
    /// Graduated to the execution workflow.
    Graduated,
    /// No workflow rows at all; valid but outside every lane view.
    Untracked,
}

impl Lane {
    /// Derives the lane from workflow state.
    #[must_use]
    pub const fn derive(enrichment: Option<EnrichmentStatus>, graduated: bool) -> Self {
        if graduated {
            return Self::Graduated;
        }
        match enrichment {
            Some(EnrichmentStatus::Pending) => Self::Queued,
            Some(EnrichmentStatus::Processing) => Self::Enriching,
            Some(EnrichmentStatus::Completed) => Self::Ready,
            Some(EnrichmentStatus::Failed) => Self::Failed,
            None => Self::Untracked,
        }
    }
}

/// A row of the pre-migration single-table dataset, reduced to the fields
/// the migration mapper consumes.
///
/// Task content and metadata columns are copied table-to-table by the
/// migration engine and never pass through this record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTaskRecord {
    /// Opaque task key.
    pub id: TaskId,
    /// Enrichment-workflow status, when the task ever entered that workflow.
    pub enrichment_status: Option<EnrichmentStatus>,
    /// Enrichment failure detail.
    pub error_message: Option<String>,
    /// Execution-workflow status, when the task ever reached the todo list.
    pub execution_status: Option<TodoStatus>,
    /// Raw extraction-suggestion JSON carried verbatim into the workbench.
    pub metadata_suggestions: Option<String>,
    /// Original creation timestamp; drives todo position ranking.
    pub created_at: DateTime<Utc>,
}

/// The legacy single-table record shape, reconstructed from the three
/// decomposed tables.
///
/// Field names and types match the pre-migration schema so callers built
/// against the single table observe no change. Statuses are `None` when the
/// corresponding workflow row is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskView {
    /// Task key.
    pub id: TaskId,
    /// Raw text as captured from the user.
    pub user_input: String,
    /// Text rewritten by the enrichment pipeline.
    pub enriched_text: Option<String>,
    /// Enrichment-workflow status, from the workbench row.
    pub enrichment_status: Option<EnrichmentStatus>,
    /// Enrichment failure detail, from the workbench row.
    pub error_message: Option<String>,
    /// Extraction suggestions, from the workbench row.
    pub metadata_suggestions: Option<MetadataSuggestions>,
    /// When the task graduated to the todo list, from the workbench row.
    pub moved_to_todos_at: Option<DateTime<Utc>>,
    /// Execution-workflow status, from the todo row.
    pub status: Option<TodoStatus>,
    /// Todo-list ordering position, from the todo row.
    pub position: Option<i32>,
    /// Enriched metadata attributes.
    pub metadata: TaskMetadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last content-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    /// Returns the workflow lane this task currently occupies.
    ///
    /// Graduation is read from the workbench stamp so the lane is correct in
    /// views that never join the todo row; the todo status covers records
    /// migrated from execution-only legacy rows, which have no stamp.
    #[must_use]
    pub const fn lane(&self) -> Lane {
        Lane::derive(
            self.enrichment_status,
            self.moved_to_todos_at.is_some() || self.status.is_some(),
        )
    }
}
