use crate::modules::reports::controller::download_report;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn init_reports_router() -> Router<AppState> {
    Router::new().route("/{kind}/{format}", get(download_report))
}
