//! Pure legacy-record to target-row transformation.
//!
//! No database access: the mapper receives the fully materialized legacy
//! dataset and computes which target rows each record produces. Mapping the
//! same dataset twice yields identical rows apart from the freshly
//! generated row keys.

use crate::task::domain::{
    EnrichmentStatus, LegacyTaskRecord, TaskId, TodoId, TodoStatus, WorkbenchId,
};
use chrono::{DateTime, Utc};

/// Workbench row computed for one legacy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchSeed {
    /// Fresh row key.
    pub id: WorkbenchId,
    /// Owning task key.
    pub task_id: TaskId,
    /// Carried-over enrichment status.
    pub status: EnrichmentStatus,
    /// Carried-over failure detail.
    pub error_message: Option<String>,
    /// Carried-over extraction-suggestion JSON.
    pub metadata_suggestions: Option<String>,
    /// Graduation timestamp; set only when the record also has execution
    /// state, approximated as the new todo row's creation time since the
    /// historical transition time is unknown.
    pub graduated_at: Option<DateTime<Utc>>,
    /// Original record creation time.
    pub created_at: DateTime<Utc>,
    /// Migration time.
    pub updated_at: DateTime<Utc>,
}

/// Todo row computed for one legacy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoSeed {
    /// Fresh row key.
    pub id: TodoId,
    /// Owning task key.
    pub task_id: TaskId,
    /// Carried-over execution status.
    pub status: TodoStatus,
    /// Dense 1-based rank over all execution-state records, ordered by
    /// original creation time with the task key as tie-break.
    pub position: i32,
    /// Original record creation time.
    pub created_at: DateTime<Utc>,
    /// Migration time.
    pub updated_at: DateTime<Utc>,
}

/// All target rows computed from one legacy dataset.
#[derive(Debug, Clone, Default)]
pub struct MappedRows {
    /// Workbench rows, one per record with enrichment state.
    pub workbench: Vec<WorkbenchSeed>,
    /// Todo rows, one per record with execution state.
    pub todos: Vec<TodoSeed>,
}

impl MappedRows {
    /// Number of records that produced both a workbench and a todo row.
    #[must_use]
    pub fn graduated(&self) -> usize {
        self.workbench
            .iter()
            .filter(|seed| seed.graduated_at.is_some())
            .count()
    }
}

/// Maps a legacy dataset to its target rows.
///
/// Input order does not matter: position ranking sorts internally by
/// `(created_at, id)` ascending, oldest first, positions starting at 1.
#[must_use]
pub fn map_dataset(records: &[LegacyTaskRecord], now: DateTime<Utc>) -> MappedRows {
    let positions = rank_positions(records);
    let mut mapped = MappedRows::default();

    for (record, position) in records.iter().zip(positions) {
        // Rank is only computed for records with execution state, so the
        // status is present exactly when a position is.
        let todo = match (record.execution_status, position) {
            (Some(status), Some(position)) => Some(TodoSeed {
                id: TodoId::generate(),
                task_id: record.id.clone(),
                status,
                position,
                created_at: record.created_at,
                updated_at: now,
            }),
            _ => None,
        };

        if let Some(status) = record.enrichment_status {
            mapped.workbench.push(WorkbenchSeed {
                id: WorkbenchId::generate(),
                task_id: record.id.clone(),
                status,
                error_message: record.error_message.clone(),
                metadata_suggestions: record.metadata_suggestions.clone(),
                graduated_at: todo.as_ref().map(|seed| seed.created_at),
                created_at: record.created_at,
                updated_at: now,
            });
        }

        if let Some(seed) = todo {
            mapped.todos.push(seed);
        }
    }

    mapped
}

/// Computes, for each record, its todo position (`None` when the record has
/// no execution state).
fn rank_positions(records: &[LegacyTaskRecord]) -> Vec<Option<i32>> {
    let mut candidates: Vec<(usize, &LegacyTaskRecord)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.execution_status.is_some())
        .collect();
    candidates.sort_by(|(_, a), (_, b)| {
        a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id))
    });

    let mut positions = vec![None; records.len()];
    for (rank, (index, _)) in candidates.iter().enumerate() {
        if let (Some(slot), Ok(position)) =
            (positions.get_mut(*index), i32::try_from(rank + 1))
        {
            *slot = Some(position);
        }
    }
    positions
}
