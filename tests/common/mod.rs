//! Common test utilities and helpers
//!
//! Shared fixtures, factories and the API test client.

#![allow(dead_code)]

pub mod factories;
pub mod fixtures;
pub mod test_app;

pub use factories::*;
pub use fixtures::*;
pub use test_app::*;
