//! Integration tests for the audit engine
//!
//! API tests run against the real router over in-memory SQLite; engine tests
//! exercise the query and statistics functions directly.

mod api_tests;
mod engine_tests;
