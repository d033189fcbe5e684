//! Shared utilities

pub mod error;
pub mod validation;

pub use error::{AppError, AppResult, AuditError, MissingWrite, PartialAuditWriteWarning};
