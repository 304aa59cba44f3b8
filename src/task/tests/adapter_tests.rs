//! Row-conversion tests for the `SQLite` adapter boundary.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use crate::task::adapters::sqlite::models::{
    TaskRow, TodoRow, WorkbenchRow, compose_view, decode_list, encode_list,
};
use crate::task::domain::{EnrichmentStatus, Lane, TodoStatus};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn task_row() -> TaskRow {
    let at = Utc.with_ymd_and_hms(2025, 11, 7, 9, 30, 0).single().expect("valid timestamp");
    TaskRow {
        id: "task-1".to_owned(),
        user_input: "call Dana about the quarterly report".to_owned(),
        enriched_text: Some("Call Dana to review the quarterly report".to_owned()),
        project: Some("reporting".to_owned()),
        persons: Some(r#"["Dana"]"#.to_owned()),
        task_type: Some("call".to_owned()),
        priority: Some("high".to_owned()),
        deadline_text: Some("friday".to_owned()),
        deadline_parsed: None,
        effort_estimate: Some(30),
        dependencies: None,
        tags: Some(r#"["q3","finance"]"#.to_owned()),
        extracted_at: Some(at),
        requires_attention: false,
        created_at: at,
        updated_at: at,
    }
}

#[rstest]
fn compose_view_reconstructs_legacy_shape(task_row: TaskRow) {
    let at = task_row.created_at;
    let workbench_row = WorkbenchRow {
        id: "wb-1".to_owned(),
        task_id: "task-1".to_owned(),
        enrichment_status: "completed".to_owned(),
        error_message: None,
        metadata_suggestions: None,
        moved_to_todos_at: Some(at),
        created_at: at,
        updated_at: at,
    };
    let todo_row = TodoRow {
        id: "todo-1".to_owned(),
        task_id: "task-1".to_owned(),
        status: "open".to_owned(),
        position: 4,
        created_at: at,
        updated_at: at,
    };

    let view = compose_view(task_row, Some(workbench_row), Some(todo_row))
        .expect("row conversion should succeed");

    assert_eq!(view.id.as_str(), "task-1");
    assert_eq!(view.enrichment_status, Some(EnrichmentStatus::Completed));
    assert_eq!(view.status, Some(TodoStatus::Open));
    assert_eq!(view.position, Some(4));
    assert_eq!(view.moved_to_todos_at, Some(at));
    assert_eq!(view.metadata.persons, vec!["Dana".to_owned()]);
    assert_eq!(
        view.metadata.tags,
        vec!["q3".to_owned(), "finance".to_owned()]
    );
    assert!(view.metadata.dependencies.is_empty());
    assert_eq!(view.lane(), Lane::Graduated);
}

#[rstest]
fn graduation_stamp_alone_places_the_view_in_the_graduated_lane(task_row: TaskRow) {
    let at = task_row.created_at;
    let workbench_row = WorkbenchRow {
        id: "wb-1".to_owned(),
        task_id: "task-1".to_owned(),
        enrichment_status: "completed".to_owned(),
        error_message: None,
        metadata_suggestions: None,
        moved_to_todos_at: Some(at),
        created_at: at,
        updated_at: at,
    };

    // No todo row joined, as in the workbench-only views.
    let view = compose_view(task_row, Some(workbench_row), None)
        .expect("row conversion should succeed");

    assert_eq!(view.status, None);
    assert_eq!(view.lane(), Lane::Graduated);
}

#[rstest]
fn compose_view_leaves_statuses_absent_without_workflow_rows(task_row: TaskRow) {
    let view = compose_view(task_row, None, None).expect("row conversion should succeed");

    assert_eq!(view.enrichment_status, None);
    assert_eq!(view.status, None);
    assert_eq!(view.position, None);
    assert_eq!(view.lane(), Lane::Untracked);
}

#[rstest]
fn compose_view_rejects_corrupt_status(task_row: TaskRow) {
    let at = task_row.created_at;
    let workbench_row = WorkbenchRow {
        id: "wb-1".to_owned(),
        task_id: "task-1".to_owned(),
        enrichment_status: "bogus".to_owned(),
        error_message: None,
        metadata_suggestions: None,
        moved_to_todos_at: None,
        created_at: at,
        updated_at: at,
    };

    assert!(compose_view(task_row, Some(workbench_row), None).is_err());
}

#[rstest]
fn list_codec_stores_empty_lists_as_null() {
    assert_eq!(encode_list(&[]).expect("encoding should succeed"), None);
    assert_eq!(
        decode_list(None).expect("decoding should succeed"),
        Vec::<String>::new()
    );
}

#[rstest]
fn list_codec_round_trips_values() {
    let values = vec!["alpha".to_owned(), "beta".to_owned()];
    let encoded = encode_list(&values)
        .expect("encoding should succeed")
        .expect("non-empty list should encode to text");
    assert_eq!(
        decode_list(Some(&encoded)).expect("decoding should succeed"),
        values
    );
}

#[rstest]
fn list_codec_rejects_malformed_json() {
    assert!(decode_list(Some("not json")).is_err());
}
