//! Diesel schema for the three-table task workflow persistence.

diesel::table! {
    /// Immutable task content and enriched metadata.
    tasks (id) {
        /// Opaque task key.
        id -> Text,
        /// Raw text as captured from the user.
        user_input -> Text,
        /// Text rewritten by the enrichment pipeline.
        enriched_text -> Nullable<Text>,
        /// Project the task belongs to.
        project -> Nullable<Text>,
        /// People mentioned in the task text, as a JSON array.
        persons -> Nullable<Text>,
        /// Free-form task category.
        task_type -> Nullable<Text>,
        /// Free-form priority label.
        priority -> Nullable<Text>,
        /// Deadline as written by the user.
        deadline_text -> Nullable<Text>,
        /// Deadline resolved to a concrete instant.
        deadline_parsed -> Nullable<TimestamptzSqlite>,
        /// Estimated effort in minutes.
        effort_estimate -> Nullable<Integer>,
        /// Dependency list, as a JSON array.
        dependencies -> Nullable<Text>,
        /// Tag list, as a JSON array.
        tags -> Nullable<Text>,
        /// When the enrichment pipeline extracted the metadata.
        extracted_at -> Nullable<TimestamptzSqlite>,
        /// Whether the extraction flagged the task for user review.
        requires_attention -> Bool,
        /// Creation timestamp.
        created_at -> TimestamptzSqlite,
        /// Last content-update timestamp.
        updated_at -> TimestamptzSqlite,
    }
}

diesel::table! {
    /// Enrichment-workflow state, at most one row per task.
    workbench (id) {
        /// Workbench row key.
        id -> Text,
        /// Owning task key, unique.
        task_id -> Text,
        /// Enrichment-workflow status.
        enrichment_status -> Text,
        /// Enrichment failure detail.
        error_message -> Nullable<Text>,
        /// Extraction-suggestion payload, as JSON.
        metadata_suggestions -> Nullable<Text>,
        /// When the task graduated to the todo list; set at most once.
        moved_to_todos_at -> Nullable<TimestamptzSqlite>,
        /// Creation timestamp.
        created_at -> TimestamptzSqlite,
        /// Last state-update timestamp.
        updated_at -> TimestamptzSqlite,
    }
}

diesel::table! {
    /// Execution-workflow state, at most one row per task.
    todos (id) {
        /// Todo row key.
        id -> Text,
        /// Owning task key, unique.
        task_id -> Text,
        /// Execution-workflow status.
        status -> Text,
        /// Dense ordering position, assigned at creation.
        position -> Integer,
        /// Creation timestamp.
        created_at -> TimestamptzSqlite,
        /// Last state-update timestamp.
        updated_at -> TimestamptzSqlite,
    }
}

diesel::joinable!(workbench -> tasks (task_id));
diesel::joinable!(todos -> tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(tasks, workbench, todos);
