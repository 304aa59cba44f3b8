//! Domain model for task capture and workflow state.
//!
//! The task domain models immutable captured content, the enrichment
//! workflow (workbench), and the execution workflow (todos) while keeping
//! all infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod metadata;
mod records;
mod status;

pub use error::{ParseEnrichmentStatusError, ParseTodoStatusError, TaskDomainError};
pub use ids::{TaskId, TodoId, WorkbenchId};
pub use metadata::{FieldSuggestion, MetadataSuggestions, SuggestionValue, TaskMetadata};
pub use records::{Lane, LegacyTaskRecord, TaskView};
pub use status::{EnrichmentStatus, TodoStatus};
