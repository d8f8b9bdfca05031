use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use escola_core::AppError;
use tracing::instrument;

use crate::modules::reports::model::{ErrorResponse, FilterCriteria, ReportFormat, ReportKind};
use crate::modules::reports::service::ReportService;
use crate::state::AppState;

/// Generate a report as PDF or XLSX
#[utoipa::path(
    get,
    path = "/api/reports/{kind}/{format}",
    params(
        ("kind" = String, Path, description = "students | classes | courses | instructors | attendance"),
        ("format" = String, Path, description = "pdf | xlsx"),
        FilterCriteria
    ),
    responses(
        (status = 200, description = "Report file with Content-Disposition attachment"),
        (status = 400, description = "Invalid or missing filter", body = ErrorResponse),
        (status = 404, description = "Unknown report type or referenced entity", body = ErrorResponse),
        (status = 500, description = "Store failure or internal fault", body = ErrorResponse)
    ),
    tag = "Reports"
)]
#[instrument(skip(state, criteria))]
pub async fn download_report(
    State(state): State<AppState>,
    Path((kind, format)): Path<(String, String)>,
    criteria: Result<Query<FilterCriteria>, QueryRejection>,
) -> Result<Response, AppError> {
    let kind: ReportKind = kind
        .parse()
        .map_err(|e: String| AppError::not_found(anyhow::anyhow!(e)))?;
    let format: ReportFormat = format
        .parse()
        .map_err(|e: String| AppError::bad_request(anyhow::anyhow!(e)))?;
    let Query(criteria) = criteria.map_err(AppError::bad_request)?;

    let now = Utc::now();
    let artifact = ReportService::generate(
        state.store.as_ref(),
        &state.report_config,
        kind,
        format,
        &criteria,
        now,
    )
    .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        artifact.file_name(now.date_naive())
    );

    Ok((
        [
            (header::CONTENT_TYPE, artifact.media_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
