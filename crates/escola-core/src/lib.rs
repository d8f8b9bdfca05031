//! # Escola Core
//!
//! Core types, errors, and utilities for the Escola reporting engine.
//!
//! - [`errors`]: Report error taxonomy and the HTTP error envelope
//! - [`serde`]: Query-string deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use escola_core::errors::{AppError, ReportError};
//!
//! let err = ReportError::validation("attendance report requires classId");
//! let response: AppError = err.into(); // 400
//! ```

pub mod errors;
pub mod serde;

pub use errors::{AppError, ReportError, StoreError};
