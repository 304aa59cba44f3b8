//! Diesel row models and row-to-domain conversion for task persistence.
//!
//! List-valued metadata and suggestion payloads are stored as JSON text;
//! this module is the only place they are encoded or decoded.

use super::schema::{tasks, todos, workbench};
use crate::task::domain::{
    MetadataSuggestions, TaskId, TaskMetadata, TaskView, TodoStatus,
};
use crate::task::ports::TaskStoreError;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task content.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    /// Opaque task key.
    pub id: String,
    /// Raw captured text.
    pub user_input: String,
    /// Enriched text.
    pub enriched_text: Option<String>,
    /// Project label.
    pub project: Option<String>,
    /// Person list as JSON text.
    pub persons: Option<String>,
    /// Task category.
    pub task_type: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Deadline as written.
    pub deadline_text: Option<String>,
    /// Parsed deadline.
    pub deadline_parsed: Option<DateTime<Utc>>,
    /// Effort estimate in minutes.
    pub effort_estimate: Option<i32>,
    /// Dependency list as JSON text.
    pub dependencies: Option<String>,
    /// Tag list as JSON text.
    pub tags: Option<String>,
    /// Metadata extraction timestamp.
    pub extracted_at: Option<DateTime<Utc>>,
    /// Attention flag.
    pub requires_attention: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last content-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for enrichment-workflow state.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = workbench)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkbenchRow {
    /// Workbench row key.
    pub id: String,
    /// Owning task key.
    pub task_id: String,
    /// Enrichment status as its canonical string.
    pub enrichment_status: String,
    /// Failure detail.
    pub error_message: Option<String>,
    /// Suggestion payload as JSON text.
    pub metadata_suggestions: Option<String>,
    /// Graduation timestamp.
    pub moved_to_todos_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for execution-workflow state.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = todos)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TodoRow {
    /// Todo row key.
    pub id: String,
    /// Owning task key.
    pub task_id: String,
    /// Execution status as its canonical string.
    pub status: String,
    /// Ordering position.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task content.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Opaque task key.
    pub id: String,
    /// Raw captured text.
    pub user_input: String,
    /// Enriched text.
    pub enriched_text: Option<String>,
    /// Project label.
    pub project: Option<String>,
    /// Person list as JSON text.
    pub persons: Option<String>,
    /// Task category.
    pub task_type: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Deadline as written.
    pub deadline_text: Option<String>,
    /// Parsed deadline.
    pub deadline_parsed: Option<DateTime<Utc>>,
    /// Effort estimate in minutes.
    pub effort_estimate: Option<i32>,
    /// Dependency list as JSON text.
    pub dependencies: Option<String>,
    /// Tag list as JSON text.
    pub tags: Option<String>,
    /// Metadata extraction timestamp.
    pub extracted_at: Option<DateTime<Utc>>,
    /// Attention flag.
    pub requires_attention: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last content-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for enrichment-workflow rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workbench)]
pub struct NewWorkbenchRow {
    /// Workbench row key.
    pub id: String,
    /// Owning task key.
    pub task_id: String,
    /// Enrichment status as its canonical string.
    pub enrichment_status: String,
    /// Failure detail.
    pub error_message: Option<String>,
    /// Suggestion payload as JSON text.
    pub metadata_suggestions: Option<String>,
    /// Graduation timestamp.
    pub moved_to_todos_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for execution-workflow rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = todos)]
pub struct NewTodoRow {
    /// Todo row key.
    pub id: String,
    /// Owning task key.
    pub task_id: String,
    /// Execution status as its canonical string.
    pub status: String,
    /// Ordering position.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset replacing the mutable content columns of a task wholesale.
///
/// `treat_none_as_null` because every field is a full replacement: the
/// enrichment pipeline writes the complete block, and absent values must
/// clear stale ones.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskContentChangeset {
    /// Enriched text.
    pub enriched_text: Option<String>,
    /// Project label.
    pub project: Option<String>,
    /// Person list as JSON text.
    pub persons: Option<String>,
    /// Task category.
    pub task_type: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Deadline as written.
    pub deadline_text: Option<String>,
    /// Parsed deadline.
    pub deadline_parsed: Option<DateTime<Utc>>,
    /// Effort estimate in minutes.
    pub effort_estimate: Option<i32>,
    /// Dependency list as JSON text.
    pub dependencies: Option<String>,
    /// Tag list as JSON text.
    pub tags: Option<String>,
    /// Metadata extraction timestamp.
    pub extracted_at: Option<DateTime<Utc>>,
    /// Attention flag.
    pub requires_attention: bool,
    /// Last content-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Encodes a string list as JSON text, storing `NULL` for an empty list.
pub fn encode_list(values: &[String]) -> Result<Option<String>, TaskStoreError> {
    if values.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(values)
        .map(Some)
        .map_err(TaskStoreError::persistence)
}

/// Decodes JSON text into a string list, treating `NULL` as empty.
pub fn decode_list(raw: Option<&str>) -> Result<Vec<String>, TaskStoreError> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |text| serde_json::from_str(text).map_err(TaskStoreError::persistence),
    )
}

/// Encodes a suggestion payload as JSON text.
pub fn encode_suggestions(
    suggestions: &MetadataSuggestions,
) -> Result<Option<String>, TaskStoreError> {
    serde_json::to_string(suggestions)
        .map(Some)
        .map_err(TaskStoreError::persistence)
}

/// Decodes a suggestion payload from JSON text.
pub fn decode_suggestions(
    raw: Option<&str>,
) -> Result<Option<MetadataSuggestions>, TaskStoreError> {
    raw.map(|text| serde_json::from_str(text).map_err(TaskStoreError::persistence))
        .transpose()
}

/// Reconstructs the legacy single-table record shape from the joined rows.
pub fn compose_view(
    task: TaskRow,
    workbench_row: Option<WorkbenchRow>,
    todo_row: Option<TodoRow>,
) -> Result<TaskView, TaskStoreError> {
    let metadata = TaskMetadata {
        project: task.project,
        persons: decode_list(task.persons.as_deref())?,
        task_type: task.task_type,
        priority: task.priority,
        deadline_text: task.deadline_text,
        deadline_parsed: task.deadline_parsed,
        effort_estimate: task.effort_estimate,
        dependencies: decode_list(task.dependencies.as_deref())?,
        tags: decode_list(task.tags.as_deref())?,
        extracted_at: task.extracted_at,
        requires_attention: task.requires_attention,
    };

    let (enrichment_status, error_message, metadata_suggestions, moved_to_todos_at) =
        match workbench_row {
            Some(row) => (
                Some(
                    crate::task::domain::EnrichmentStatus::try_from(row.enrichment_status.as_str())
                        .map_err(TaskStoreError::persistence)?,
                ),
                row.error_message,
                decode_suggestions(row.metadata_suggestions.as_deref())?,
                row.moved_to_todos_at,
            ),
            None => (None, None, None, None),
        };

    let (status, position) = match todo_row {
        Some(row) => (
            Some(TodoStatus::try_from(row.status.as_str()).map_err(TaskStoreError::persistence)?),
            Some(row.position),
        ),
        None => (None, None),
    };

    Ok(TaskView {
        id: TaskId::new(task.id)?,
        user_input: task.user_input,
        enriched_text: task.enriched_text,
        enrichment_status,
        error_message,
        metadata_suggestions,
        moved_to_todos_at,
        status,
        position,
        metadata,
        created_at: task.created_at,
        updated_at: task.updated_at,
    })
}
