//! Port contracts for task workflow persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the application
//! layer and the enrichment pipeline.

pub mod store;

pub use store::{ContentUpdate, EnrichmentUpdate, TaskStore, TaskStoreError, TaskStoreResult};
