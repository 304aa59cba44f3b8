//! Structured task metadata and extraction-suggestion payloads.
//!
//! The legacy schema stored list-valued fields and suggestion payloads as
//! opaque JSON text. Inside the crate they are typed; serialization back to
//! JSON text happens only at the storage adapter boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Enriched metadata attributes attached to a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Project the task belongs to.
    pub project: Option<String>,
    /// People mentioned in the task text.
    pub persons: Vec<String>,
    /// Free-form task category.
    pub task_type: Option<String>,
    /// Free-form priority label.
    pub priority: Option<String>,
    /// Deadline as written by the user.
    pub deadline_text: Option<String>,
    /// Deadline resolved to a concrete instant, when parseable.
    pub deadline_parsed: Option<DateTime<Utc>>,
    /// Estimated effort in minutes.
    pub effort_estimate: Option<i32>,
    /// Other tasks or artefacts this task depends on.
    pub dependencies: Vec<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// When the enrichment pipeline extracted this metadata.
    pub extracted_at: Option<DateTime<Utc>>,
    /// Whether the extraction flagged the task for user review.
    pub requires_attention: bool,
}

/// A single value proposed by the extraction pipeline.
///
/// Mirrors the extraction response shape: the proposed value, the model's
/// confidence in it, and any alternatives it considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSuggestion {
    /// Proposed value, absent when the field could not be extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SuggestionValue>,
    /// Extraction confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Alternative values the extraction considered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

/// Scalar or list value carried by a [`FieldSuggestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionValue {
    /// Single text value (project, priority, deadline text, ...).
    Text(String),
    /// List value (persons, dependencies, tags).
    List(Vec<String>),
}

/// Extraction suggestions keyed by metadata field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSuggestions {
    /// Per-field suggestions.
    pub fields: BTreeMap<String, FieldSuggestion>,
}

impl MetadataSuggestions {
    /// Returns the suggestion for the named metadata field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSuggestion> {
        self.fields.get(name)
    }
}
