//! Report generation: filter resolution, the shared row model, and the two
//! renderers (paginated PDF and single-sheet workbook) built from it.

pub mod controller;
pub mod document;
pub mod filters;
pub mod model;
pub mod pdf;
pub mod router;
pub mod rows;
pub mod service;
pub mod workbook;

pub use model::*;
pub use router::init_reports_router;
