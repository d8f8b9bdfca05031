use axum::{Json, extract::State};
use chrono::Utc;
use escola_core::AppError;
use tracing::instrument;

use crate::modules::dashboard::model::DashboardSnapshot;
use crate::modules::dashboard::service::DashboardService;
use crate::modules::reports::model::ErrorResponse;
use crate::state::AppState;

/// Current dashboard statistics
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Aggregated counts, rates and the 12-month enrollment histogram", body = DashboardSnapshot),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "Dashboard"
)]
#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSnapshot>, AppError> {
    let snapshot =
        DashboardService::snapshot(state.store.as_ref(), &state.report_config, Utc::now()).await?;
    Ok(Json(snapshot))
}
