//! Unit tests for the task domain and adapter row conversion.

mod adapter_tests;
