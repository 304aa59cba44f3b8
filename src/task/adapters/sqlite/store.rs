//! `SQLite` implementation of the task store port.
//!
//! Every logical update touches exactly one table, so no locking beyond
//! standard transactional isolation is needed; graduation is the only
//! multi-table write and runs in its own transaction.

use super::models::{
    NewTaskRow, NewTodoRow, NewWorkbenchRow, TaskContentChangeset, TaskRow, TodoRow, WorkbenchRow,
    compose_view, encode_list, encode_suggestions,
};
use super::schema::{tasks, todos, workbench};
use super::TaskSqlitePool;
use crate::task::domain::{
    EnrichmentStatus, TaskDomainError, TaskId, TaskView, TodoId, TodoStatus, WorkbenchId,
};
use crate::task::ports::{
    ContentUpdate, EnrichmentUpdate, TaskStore, TaskStoreError, TaskStoreResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use mockable::Clock;
use std::sync::Arc;

/// `SQLite`-backed task store.
#[derive(Clone)]
pub struct SqliteTaskStore<C>
where
    C: Clock + Send + Sync,
{
    pool: TaskSqlitePool,
    clock: Arc<C>,
}

impl<C> SqliteTaskStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new store from a connection pool and clock.
    #[must_use]
    pub const fn new(pool: TaskSqlitePool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskStoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> TaskStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskStoreError::persistence)?
    }
}

#[async_trait]
impl<C> TaskStore for SqliteTaskStore<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn submit(&self, user_input: &str) -> TaskStoreResult<TaskView> {
        if user_input.trim().is_empty() {
            return Err(TaskDomainError::EmptyUserInput.into());
        }

        let task_id = TaskId::generate();
        let now = self.now();
        let task_row = NewTaskRow {
            id: task_id.as_str().to_owned(),
            user_input: user_input.to_owned(),
            enriched_text: None,
            project: None,
            persons: None,
            task_type: None,
            priority: None,
            deadline_text: None,
            deadline_parsed: None,
            effort_estimate: None,
            dependencies: None,
            tags: None,
            extracted_at: None,
            requires_attention: false,
            created_at: now,
            updated_at: now,
        };
        let workbench_row = NewWorkbenchRow {
            id: WorkbenchId::generate().as_str().to_owned(),
            task_id: task_id.as_str().to_owned(),
            enrichment_status: EnrichmentStatus::Pending.as_str().to_owned(),
            error_message: None,
            metadata_suggestions: None,
            moved_to_todos_at: None,
            created_at: now,
            updated_at: now,
        };

        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                diesel::insert_into(tasks::table)
                    .values(&task_row)
                    .execute(connection)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskStoreError::DuplicateTask(task_id.clone())
                        }
                        _ => TaskStoreError::persistence(err),
                    })?;
                diesel::insert_into(workbench::table)
                    .values(&workbench_row)
                    .execute(connection)
                    .map_err(TaskStoreError::persistence)?;
                require_view(connection, &task_id)
            })
        })
        .await
    }

    async fn fetch(&self, id: &TaskId) -> TaskStoreResult<Option<TaskView>> {
        let lookup_id = id.clone();
        self.run_blocking(move |connection| load_view(connection, &lookup_id))
            .await
    }

    async fn list(&self) -> TaskStoreResult<Vec<TaskView>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .left_join(workbench::table)
                .left_join(todos::table)
                .select((
                    TaskRow::as_select(),
                    Option::<WorkbenchRow>::as_select(),
                    Option::<TodoRow>::as_select(),
                ))
                .order(tasks::created_at.desc())
                .load::<(TaskRow, Option<WorkbenchRow>, Option<TodoRow>)>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter()
                .map(|(task, wb, todo)| compose_view(task, wb, todo))
                .collect()
        })
        .await
    }

    async fn update_content(&self, id: &TaskId, update: ContentUpdate) -> TaskStoreResult<TaskView> {
        let target_id = id.clone();
        let now = self.now();
        let changeset = TaskContentChangeset {
            enriched_text: update.enriched_text,
            project: update.metadata.project,
            persons: encode_list(&update.metadata.persons)?,
            task_type: update.metadata.task_type,
            priority: update.metadata.priority,
            deadline_text: update.metadata.deadline_text,
            deadline_parsed: update.metadata.deadline_parsed,
            effort_estimate: update.metadata.effort_estimate,
            dependencies: encode_list(&update.metadata.dependencies)?,
            tags: encode_list(&update.metadata.tags)?,
            extracted_at: update.metadata.extracted_at,
            requires_attention: update.metadata.requires_attention,
            updated_at: now,
        };

        self.run_blocking(move |connection| {
            let affected =
                diesel::update(tasks::table.filter(tasks::id.eq(target_id.as_str().to_owned())))
                    .set(&changeset)
                    .execute(connection)
                    .map_err(TaskStoreError::persistence)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(target_id.clone()));
            }
            require_view(connection, &target_id)
        })
        .await
    }

    async fn update_enrichment(
        &self,
        id: &TaskId,
        update: EnrichmentUpdate,
    ) -> TaskStoreResult<TaskView> {
        let target_id = id.clone();
        let now = self.now();
        let encoded_suggestions = match update.suggestions.as_ref() {
            Some(suggestions) => encode_suggestions(suggestions)?,
            None => None,
        };
        let replace_suggestions = update.suggestions.is_some();

        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let current = workbench::table
                    .filter(workbench::task_id.eq(target_id.as_str().to_owned()))
                    .select(WorkbenchRow::as_select())
                    .first::<WorkbenchRow>(connection)
                    .optional()
                    .map_err(TaskStoreError::persistence)?
                    .ok_or_else(|| TaskStoreError::MissingWorkbenchEntry(target_id.clone()))?;

                let status = update.status.map_or_else(
                    || current.enrichment_status.clone(),
                    |new_status| new_status.as_str().to_owned(),
                );
                let suggestions = if replace_suggestions {
                    encoded_suggestions.clone()
                } else {
                    current.metadata_suggestions.clone()
                };

                diesel::update(
                    workbench::table.filter(workbench::task_id.eq(target_id.as_str().to_owned())),
                )
                .set((
                    workbench::enrichment_status.eq(status),
                    workbench::error_message.eq(update.error_message.clone()),
                    workbench::metadata_suggestions.eq(suggestions),
                    workbench::updated_at.eq(now),
                ))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;

                require_view(connection, &target_id)
            })
        })
        .await
    }

    async fn retry_enrichment(&self, id: &TaskId) -> TaskStoreResult<TaskView> {
        let target_id = id.clone();
        let now = self.now();
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                workbench::table.filter(workbench::task_id.eq(target_id.as_str().to_owned())),
            )
            .set((
                workbench::enrichment_status.eq(EnrichmentStatus::Pending.as_str()),
                workbench::error_message.eq(None::<String>),
                workbench::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(TaskStoreError::persistence)?;
            if affected == 0 {
                return Err(TaskStoreError::MissingWorkbenchEntry(target_id.clone()));
            }
            require_view(connection, &target_id)
        })
        .await
    }

    async fn graduate(&self, id: &TaskId) -> TaskStoreResult<TaskView> {
        let target_id = id.clone();
        let now = self.now();
        self.run_blocking(move |connection| {
            connection.transaction(|connection| {
                let has_workbench = workbench::table
                    .filter(workbench::task_id.eq(target_id.as_str().to_owned()))
                    .select(workbench::id)
                    .first::<String>(connection)
                    .optional()
                    .map_err(TaskStoreError::persistence)?
                    .is_some();
                if !has_workbench {
                    return Err(TaskStoreError::MissingWorkbenchEntry(target_id.clone()));
                }

                let next_position = todos::table
                    .select(diesel::dsl::max(todos::position))
                    .first::<Option<i32>>(connection)
                    .map_err(TaskStoreError::persistence)?
                    .unwrap_or(0)
                    + 1;
                let todo_row = NewTodoRow {
                    id: TodoId::generate().as_str().to_owned(),
                    task_id: target_id.as_str().to_owned(),
                    status: TodoStatus::Open.as_str().to_owned(),
                    position: next_position,
                    created_at: now,
                    updated_at: now,
                };
                diesel::insert_into(todos::table)
                    .values(&todo_row)
                    .execute(connection)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskStoreError::AlreadyGraduated(target_id.clone())
                        }
                        _ => TaskStoreError::persistence(err),
                    })?;

                // Stamped at most once: the filter leaves an existing
                // timestamp untouched.
                diesel::update(
                    workbench::table
                        .filter(workbench::task_id.eq(target_id.as_str().to_owned()))
                        .filter(workbench::moved_to_todos_at.is_null()),
                )
                .set((
                    workbench::moved_to_todos_at.eq(now),
                    workbench::updated_at.eq(now),
                ))
                .execute(connection)
                .map_err(TaskStoreError::persistence)?;

                require_view(connection, &target_id)
            })
        })
        .await
    }

    async fn update_todo_status(
        &self,
        id: &TaskId,
        status: TodoStatus,
    ) -> TaskStoreResult<TaskView> {
        let target_id = id.clone();
        let now = self.now();
        self.run_blocking(move |connection| {
            let affected = diesel::update(
                todos::table.filter(todos::task_id.eq(target_id.as_str().to_owned())),
            )
            .set((todos::status.eq(status.as_str()), todos::updated_at.eq(now)))
            .execute(connection)
            .map_err(TaskStoreError::persistence)?;
            if affected == 0 {
                return Err(TaskStoreError::NotGraduated(target_id.clone()));
            }
            require_view(connection, &target_id)
        })
        .await
    }

    async fn delete(&self, id: &TaskId) -> TaskStoreResult<()> {
        let target_id = id.clone();
        self.run_blocking(move |connection| {
            let affected =
                diesel::delete(tasks::table.filter(tasks::id.eq(target_id.as_str().to_owned())))
                    .execute(connection)
                    .map_err(TaskStoreError::persistence)?;
            if affected == 0 {
                return Err(TaskStoreError::NotFound(target_id.clone()));
            }
            Ok(())
        })
        .await
    }

    async fn workbench_lane(&self) -> TaskStoreResult<Vec<TaskView>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .inner_join(workbench::table)
                .select((TaskRow::as_select(), WorkbenchRow::as_select()))
                .order(workbench::updated_at.desc())
                .load::<(TaskRow, WorkbenchRow)>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter()
                .map(|(task, wb)| compose_view(task, Some(wb), None))
                .collect()
        })
        .await
    }

    async fn todo_list(&self) -> TaskStoreResult<Vec<TaskView>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .inner_join(todos::table)
                .select((TaskRow::as_select(), TodoRow::as_select()))
                .order(todos::position.asc())
                .load::<(TaskRow, TodoRow)>(connection)
                .map_err(TaskStoreError::persistence)?;
            rows.into_iter()
                .map(|(task, todo)| compose_view(task, None, Some(todo)))
                .collect()
        })
        .await
    }
}

// Lets `?` escape a Diesel transaction closure without the port layer
// knowing about Diesel.
impl From<DieselError> for TaskStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn load_view(
    connection: &mut SqliteConnection,
    id: &TaskId,
) -> TaskStoreResult<Option<TaskView>> {
    let row = tasks::table
        .left_join(workbench::table)
        .left_join(todos::table)
        .filter(tasks::id.eq(id.as_str().to_owned()))
        .select((
            TaskRow::as_select(),
            Option::<WorkbenchRow>::as_select(),
            Option::<TodoRow>::as_select(),
        ))
        .first::<(TaskRow, Option<WorkbenchRow>, Option<TodoRow>)>(connection)
        .optional()
        .map_err(TaskStoreError::persistence)?;
    row.map(|(task, wb, todo)| compose_view(task, wb, todo))
        .transpose()
}

fn require_view(connection: &mut SqliteConnection, id: &TaskId) -> TaskStoreResult<TaskView> {
    load_view(connection, id)?.ok_or_else(|| TaskStoreError::NotFound(id.clone()))
}
