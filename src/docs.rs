use utoipa::OpenApi;

use crate::modules::dashboard::model::{
    CourseEnrollmentCount, DashboardSnapshot, MonthlyEnrollment,
};
use crate::modules::reports::model::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::reports::controller::download_report,
        crate::modules::dashboard::controller::get_dashboard,
    ),
    components(
        schemas(
            DashboardSnapshot,
            CourseEnrollmentCount,
            MonthlyEnrollment,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Reports", description = "PDF and XLSX report downloads"),
        (name = "Dashboard", description = "Aggregated school statistics")
    ),
    info(
        title = "Escola API",
        version = "0.1.0",
        description = "Report generation and dashboard statistics for technical school management.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
