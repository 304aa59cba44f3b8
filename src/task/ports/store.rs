//! Store port presenting the decomposed schema in the legacy shape.
//!
//! The store is the sole sanctioned access path into the three tables for
//! application traffic. Reads reconstruct the pre-migration single-table
//! record by joining `tasks` with its optional workbench and todo rows.
//! Writes are routed structurally: each operation touches exactly one
//! underlying table (metadata to `tasks`, enrichment state to `workbench`,
//! execution state to `todos`), except [`TaskStore::graduate`], which is the
//! sanctioned two-table workflow transition.

use crate::task::domain::{
    EnrichmentStatus, MetadataSuggestions, TaskDomainError, TaskId, TaskMetadata, TaskView,
    TodoStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Enrichment-state update routed to the `workbench` table only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentUpdate {
    /// New enrichment status.
    pub status: Option<EnrichmentStatus>,
    /// Failure detail; cleared when `None`.
    pub error_message: Option<String>,
    /// Extraction suggestions; kept unchanged when `None`.
    pub suggestions: Option<MetadataSuggestions>,
}

impl EnrichmentUpdate {
    /// Creates an update that only changes the status.
    #[must_use]
    pub const fn status(status: EnrichmentStatus) -> Self {
        Self {
            status: Some(status),
            error_message: None,
            suggestions: None,
        }
    }

    /// Sets the failure detail.
    #[must_use]
    pub fn with_error(mut self, error_message: impl Into<String>) -> Self {
        self.error_message = Some(error_message.into());
        self
    }

    /// Sets the extraction suggestions.
    #[must_use]
    pub fn with_suggestions(mut self, suggestions: MetadataSuggestions) -> Self {
        self.suggestions = Some(suggestions);
        self
    }
}

/// Content update routed to the `tasks` table only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentUpdate {
    /// Replacement enriched text; cleared when `None`.
    pub enriched_text: Option<String>,
    /// Replacement metadata block.
    pub metadata: TaskMetadata,
}

/// Task persistence contract over the three-table schema.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Captures a new task, creating its immutable record and a workbench
    /// row in [`EnrichmentStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Domain`] when the input is empty after
    /// trimming, or [`TaskStoreError::DuplicateTask`] on key collision.
    async fn submit(&self, user_input: &str) -> TaskStoreResult<TaskView>;

    /// Fetches the legacy-shaped record for one task.
    ///
    /// Returns `None` when the task does not exist.
    async fn fetch(&self, id: &TaskId) -> TaskStoreResult<Option<TaskView>>;

    /// Lists all tasks in reverse chronological creation order.
    async fn list(&self) -> TaskStoreResult<Vec<TaskView>>;

    /// Replaces enriched text and metadata. Writes the `tasks` table only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn update_content(&self, id: &TaskId, update: ContentUpdate) -> TaskStoreResult<TaskView>;

    /// Applies an enrichment-state update. Writes the `workbench` table only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingWorkbenchEntry`] when the task has no
    /// workbench row.
    async fn update_enrichment(
        &self,
        id: &TaskId,
        update: EnrichmentUpdate,
    ) -> TaskStoreResult<TaskView>;

    /// Resets enrichment to [`EnrichmentStatus::Pending`] and clears the
    /// failure detail so the pipeline picks the task up again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingWorkbenchEntry`] when the task has no
    /// workbench row.
    async fn retry_enrichment(&self, id: &TaskId) -> TaskStoreResult<TaskView>;

    /// Graduates a task into the execution workflow: inserts an open todo
    /// row at the next position and stamps `moved_to_todos_at` once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::MissingWorkbenchEntry`] when the task has no
    /// workbench row, or [`TaskStoreError::AlreadyGraduated`] when a todo row
    /// already exists.
    async fn graduate(&self, id: &TaskId) -> TaskStoreResult<TaskView>;

    /// Updates the execution status. Writes the `todos` table only.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotGraduated`] when the task has no todo
    /// row.
    async fn update_todo_status(
        &self,
        id: &TaskId,
        status: TodoStatus,
    ) -> TaskStoreResult<TaskView>;

    /// Deletes a task together with its dependent workflow rows.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete(&self, id: &TaskId) -> TaskStoreResult<()>;

    /// Returns every task that has a workbench row, for lane rendering.
    ///
    /// Touches only `tasks` and `workbench`; todo fields in the returned
    /// views are always `None`.
    async fn workbench_lane(&self) -> TaskStoreResult<Vec<TaskView>>;

    /// Returns every task that has a todo row, ordered by position.
    ///
    /// Touches only `tasks` and `todos`; workbench fields in the returned
    /// views are always `None`.
    async fn todo_list(&self) -> TaskStoreResult<Vec<TaskView>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// Domain validation failed before any write was attempted.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task has no workbench row to update.
    #[error("task has no workbench entry: {0}")]
    MissingWorkbenchEntry(TaskId),

    /// The task already has a todo row; graduation happens at most once.
    #[error("task already graduated: {0}")]
    AlreadyGraduated(TaskId),

    /// The task has no todo row to update.
    #[error("task has not graduated: {0}")]
    NotGraduated(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
