//! Unit tests for the pure migration mapper.
