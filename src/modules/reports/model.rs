//! Report models and DTOs.
//!
//! Row types and filters live in the `escola-models` crate; this module
//! re-exports them and adds the HTTP-facing types.

use serde::Serialize;
use utoipa::ToSchema;

pub use escola_models::reports::*;
pub use escola_models::{DateRange, FilterCriteria};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
