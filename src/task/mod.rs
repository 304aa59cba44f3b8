//! Task capture, enrichment workflow, and execution workflow for Taskdeck.
//!
//! A task is captured once from free text, enriched by an external pipeline
//! into structured metadata, and graduates into the todo list when the user
//! promotes it. The immutable content lives in `tasks`, the enrichment state
//! in `workbench`, and the execution state in `todos`; the store port
//! reconstructs the legacy single-table shape for callers that predate the
//! decomposition. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
