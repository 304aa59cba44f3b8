//! Adapter implementations of the task persistence ports.

pub mod sqlite;
