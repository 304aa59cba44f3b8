//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The captured task text is empty after trimming.
    #[error("task input must not be empty")]
    EmptyUserInput,

    /// An identifier value is empty.
    #[error("identifier must not be empty")]
    EmptyIdentifier,
}

/// Error returned while parsing enrichment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown enrichment status: {0}")]
pub struct ParseEnrichmentStatusError(pub String);

/// Error returned while parsing todo statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown todo status: {0}")]
pub struct ParseTodoStatusError(pub String);
