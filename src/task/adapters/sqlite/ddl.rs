//! DDL statements shared by schema bootstrap and the legacy migration.
//!
//! `SQLite` enforces the `ON DELETE CASCADE` clauses only when
//! `PRAGMA foreign_keys = ON`, which every connection opened by this crate
//! applies.

/// Creates the immutable task content table.
pub(crate) const CREATE_TASKS: &str = "\
CREATE TABLE IF NOT EXISTS tasks (
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
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Creates the enrichment-workflow table.
pub(crate) const CREATE_WORKBENCH: &str = "\
CREATE TABLE IF NOT EXISTS workbench (
    id TEXT PRIMARY KEY NOT NULL,
    task_id TEXT NOT NULL UNIQUE REFERENCES tasks (id) ON DELETE CASCADE,
    enrichment_status TEXT NOT NULL DEFAULT 'pending',
    error_message TEXT,
    metadata_suggestions TEXT,
    moved_to_todos_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Creates the execution-workflow table.
pub(crate) const CREATE_TODOS: &str = "\
CREATE TABLE IF NOT EXISTS todos (
    id TEXT PRIMARY KEY NOT NULL,
    task_id TEXT NOT NULL UNIQUE REFERENCES tasks (id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'open',
    position INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);";

/// Supporting indexes: every foreign key, every status column, the todo
/// position, and the metadata columns the lane views filter on.
pub(crate) const CREATE_INDEXES: &str = "\
CREATE INDEX IF NOT EXISTS ix_workbench_task_id ON workbench (task_id);
CREATE INDEX IF NOT EXISTS ix_workbench_enrichment_status ON workbench (enrichment_status);
CREATE INDEX IF NOT EXISTS ix_workbench_moved_to_todos_at ON workbench (moved_to_todos_at);
CREATE INDEX IF NOT EXISTS ix_todos_task_id ON todos (task_id);
CREATE INDEX IF NOT EXISTS ix_todos_status ON todos (status);
CREATE INDEX IF NOT EXISTS ix_todos_position ON todos (position);
CREATE INDEX IF NOT EXISTS ix_tasks_project ON tasks (project);
CREATE INDEX IF NOT EXISTS ix_tasks_deadline_parsed ON tasks (deadline_parsed);";

/// Content columns copied verbatim from the legacy table into the rebuilt
/// `tasks` table. The legacy workflow columns (`enrichment_status`,
/// `status`, `error_message`, `metadata_suggestions`) are deliberately
/// absent. The migration validator checks the legacy table against this
/// same list, so a table missing any of them is rejected before the copy.
pub(crate) const CONTENT_COLUMNS: [&str; 16] = [
    "id",
    "user_input",
    "enriched_text",
    "project",
    "persons",
    "task_type",
    "priority",
    "deadline_text",
    "deadline_parsed",
    "effort_estimate",
    "dependencies",
    "tags",
    "extracted_at",
    "requires_attention",
    "created_at",
    "updated_at",
];
