//! Shared fixtures for the `SQLite` integration tests: a temporary database,
//! the legacy single-table schema, and raw-SQL probes into the target tables.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text, TimestamptzSqlite};
use diesel::sqlite::SqliteConnection;
use tempfile::TempDir;

/// Legacy single-table schema, as the application created it before the
/// decomposition migration.
pub const LEGACY_DDL: &str = "\
CREATE TABLE tasks (
    id TEXT PRIMARY KEY NOT NULL,
    user_input TEXT NOT NULL,
    enriched_text TEXT,
    project TEXT,
    persons TEXT,
    task_type TEXT,
    priority TEXT,
    deadline_text TEXT,
    deadline_parsed TEXT,
    effort_estimate INTEGER,
    dependencies TEXT,
    tags TEXT,
    extracted_at TEXT,
    requires_attention BOOLEAN NOT NULL DEFAULT 0,
    enrichment_status TEXT,
    status TEXT,
    error_message TEXT,
    metadata_suggestions TEXT,
    moved_to_todos_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// The legacy shape without a primary key, so duplicate identifiers can be
/// seeded to provoke a failure partway through the copy.
pub const LEGACY_DDL_NO_PK: &str = "\
CREATE TABLE tasks (
    id TEXT NOT NULL,
    user_input TEXT NOT NULL,
    enriched_text TEXT,
    project TEXT,
    persons TEXT,
    task_type TEXT,
    priority TEXT,
    deadline_text TEXT,
    deadline_parsed TEXT,
    effort_estimate INTEGER,
    dependencies TEXT,
    tags TEXT,
    extracted_at TEXT,
    requires_attention BOOLEAN NOT NULL DEFAULT 0,
    enrichment_status TEXT,
    status TEXT,
    error_message TEXT,
    metadata_suggestions TEXT,
    moved_to_todos_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Creates a temporary directory holding a fresh database file path.
///
/// The directory guard must stay alive for the duration of the test.
#[must_use]
pub fn temp_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("temporary directory");
    let url = dir.path().join("taskdeck.sqlite3").display().to_string();
    (dir, url)
}

/// A fixed, minute-offset timestamp for deterministic ordering.
#[must_use]
pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, minute, 0)
        .single()
        .expect("valid timestamp")
}

/// One row of the legacy single-table dataset, built up fluently and
/// inserted with raw SQL since the legacy table has no Diesel schema.
pub struct LegacySeed {
    id: String,
    user_input: String,
    enrichment_status: Option<String>,
    execution_status: Option<String>,
    error_message: Option<String>,
    metadata_suggestions: Option<String>,
    created_at: DateTime<Utc>,
}

impl LegacySeed {
    /// Starts a seed row with no workflow state.
    #[must_use]
    pub fn new(id: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_owned(),
            user_input: format!("captured task {id}"),
            enrichment_status: None,
            execution_status: None,
            error_message: None,
            metadata_suggestions: None,
            created_at,
        }
    }

    /// Sets the enrichment-workflow status column.
    #[must_use]
    pub fn enrichment(mut self, status: &str) -> Self {
        self.enrichment_status = Some(status.to_owned());
        self
    }

    /// Sets the execution-workflow status column.
    #[must_use]
    pub fn execution(mut self, status: &str) -> Self {
        self.execution_status = Some(status.to_owned());
        self
    }

    /// Sets the enrichment failure detail column.
    #[must_use]
    pub fn error(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_owned());
        self
    }

    /// Sets the extraction-suggestion JSON column.
    #[must_use]
    pub fn suggestions(mut self, json: &str) -> Self {
        self.metadata_suggestions = Some(json.to_owned());
        self
    }

    /// Inserts the row into the legacy `tasks` table.
    pub fn insert(self, conn: &mut SqliteConnection) -> QueryResult<()> {
        diesel::sql_query(
            "INSERT INTO tasks (id, user_input, enrichment_status, status, error_message, \
             metadata_suggestions, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind::<Text, _>(self.id)
        .bind::<Text, _>(self.user_input)
        .bind::<Nullable<Text>, _>(self.enrichment_status)
        .bind::<Nullable<Text>, _>(self.execution_status)
        .bind::<Nullable<Text>, _>(self.error_message)
        .bind::<Nullable<Text>, _>(self.metadata_suggestions)
        .bind::<TimestamptzSqlite, _>(self.created_at)
        .bind::<TimestamptzSqlite, _>(self.created_at)
        .execute(conn)?;
        Ok(())
    }
}

#[derive(QueryableByName)]
struct CountProbe {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Runs a `SELECT COUNT(*) AS count ...` query.
pub fn scalar_count(conn: &mut SqliteConnection, sql: &str) -> QueryResult<i64> {
    let row: CountProbe = diesel::sql_query(sql).get_result(conn)?;
    Ok(row.count)
}

/// Returns whether a table with the given name exists.
pub fn table_exists(conn: &mut SqliteConnection, name: &str) -> QueryResult<bool> {
    let row: CountProbe = diesel::sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind::<Text, _>(name)
    .get_result(conn)?;
    Ok(row.count > 0)
}

/// A todo row as the migration wrote it.
#[derive(QueryableByName)]
pub struct TodoProbe {
    /// Owning task key.
    #[diesel(sql_type = Text)]
    pub task_id: String,
    /// Stored execution status string.
    #[diesel(sql_type = Text)]
    pub status: String,
    /// Stored list position.
    #[diesel(sql_type = Integer)]
    pub position: i32,
}

/// Loads every todo row ordered by position.
pub fn todo_rows(conn: &mut SqliteConnection) -> QueryResult<Vec<TodoProbe>> {
    diesel::sql_query("SELECT task_id, status, position FROM todos ORDER BY position ASC")
        .load(conn)
}

/// A workbench row as the migration wrote it.
#[derive(QueryableByName)]
pub struct WorkbenchProbe {
    /// Owning task key.
    #[diesel(sql_type = Text)]
    pub task_id: String,
    /// Stored enrichment status string.
    #[diesel(sql_type = Text)]
    pub enrichment_status: String,
    /// Stored failure detail.
    #[diesel(sql_type = Nullable<Text>)]
    pub error_message: Option<String>,
    /// Stored extraction-suggestion JSON.
    #[diesel(sql_type = Nullable<Text>)]
    pub metadata_suggestions: Option<String>,
    /// Stored graduation timestamp.
    #[diesel(sql_type = Nullable<TimestamptzSqlite>)]
    pub moved_to_todos_at: Option<DateTime<Utc>>,
}

/// Loads every workbench row ordered by task key.
pub fn workbench_rows(conn: &mut SqliteConnection) -> QueryResult<Vec<WorkbenchProbe>> {
    diesel::sql_query(
        "SELECT task_id, enrichment_status, error_message, metadata_suggestions, \
         moved_to_todos_at FROM workbench ORDER BY task_id ASC",
    )
    .load(conn)
}
