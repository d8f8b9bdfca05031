pub mod dashboard;
pub mod reports;

pub use self::dashboard::model::DashboardSnapshot;
pub use self::reports::model::{ReportFormat, ReportKind};
