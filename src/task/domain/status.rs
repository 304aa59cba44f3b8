//! Workflow status enumerations.
//!
//! The canonical storage strings match the legacy single-table schema, so
//! migrated values and freshly written values are indistinguishable.

use super::{ParseEnrichmentStatusError, ParseTodoStatusError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enrichment-workflow status of a task on the workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    /// Queued for enrichment; nothing has run yet.
    Pending,
    /// The enrichment pipeline is currently working on the task.
    Processing,
    /// Enrichment finished successfully.
    Completed,
    /// Enrichment failed; `error_message` carries the detail.
    Failed,
}

impl EnrichmentStatus {
    /// Every valid enrichment status, in workflow order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Processing, Self::Completed, Self::Failed];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for EnrichmentStatus {
    type Error = ParseEnrichmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseEnrichmentStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution-workflow status of a task on the todo list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Work is outstanding.
    Open,
    /// Work has been completed.
    Completed,
    /// Kept for history but no longer shown in the active list.
    Archived,
}

impl TodoStatus {
    /// Every valid todo status, in workflow order.
    pub const ALL: [Self; 3] = [Self::Open, Self::Completed, Self::Archived];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl TryFrom<&str> for TodoStatus {
    type Error = ParseTodoStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseTodoStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
