//! Taskdeck: lane-based task-capture storage core.
//!
//! This crate provides the persistence core for a task-capture application
//! in which free-text input is enriched into structured metadata and tracked
//! through a lane-based workflow until it becomes a todo item. The schema
//! splits one legacy `tasks` table into three lifecycle-scoped tables:
//!
//! - `tasks`: immutable task content and enrichment metadata
//! - `workbench`: enrichment-workflow state
//! - `todos`: execution-workflow state
//!
//! # Architecture
//!
//! Taskdeck follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (`SQLite` via Diesel)
//!
//! # Modules
//!
//! - [`task`]: Domain model, store port, and `SQLite` query adapter
//! - [`migration`]: One-shot single-table to three-table schema migration

pub mod migration;
pub mod task;
