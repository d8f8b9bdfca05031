//! Dashboard statistics computed fresh from the store on every request.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::init_dashboard_router;
