use std::time::Instant;

use chrono::{DateTime, Utc};
use escola_config::ReportConfig;
use escola_core::{ReportError, StoreError};
use escola_db::EntityStore;
use escola_models::{
    FilterCriteria, ReportArtifact, ReportData, ReportFormat, ReportKind, ReportRows,
};
use tracing::{error, info, instrument};

use crate::metrics::{track_report_failure, track_report_generated};
use crate::modules::reports::document::DocumentLayoutEngine;
use crate::modules::reports::filters::{FilterResolver, ResolvedQuery};
use crate::modules::reports::pdf::write_pdf;
use crate::modules::reports::rows;
use crate::modules::reports::workbook::WorkbookBuilder;

/// Stateless report pipeline: resolve filters, fetch, then render.
pub struct ReportService;

impl ReportService {
    /// Produces a finished artifact. `now` stamps the "generated at" line.
    #[instrument(skip_all, fields(report = %kind, format = %format))]
    pub async fn generate(
        store: &dyn EntityStore,
        config: &ReportConfig,
        kind: ReportKind,
        format: ReportFormat,
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
    ) -> Result<ReportArtifact, ReportError> {
        let start = Instant::now();

        let result = match Self::collect(store, config, kind, criteria).await {
            Ok(data) => Self::render(config, &data, format, now),
            Err(e) => Err(e),
        };

        match &result {
            Ok(artifact) => {
                track_report_generated(kind, format, start.elapsed());
                info!(
                    bytes = artifact.bytes.len(),
                    elapsed_ms = %start.elapsed().as_millis(),
                    "Report generated"
                );
            }
            Err(e) => {
                track_report_failure(kind, e.kind());
                if let ReportError::Internal { stage, record, .. } = e {
                    error!(stage = %stage, record = ?record, error = %e, "Report generation fault");
                }
            }
        }

        result
    }

    /// Resolves filters and fetches rows within the configured deadline.
    ///
    /// Dropping the inner future on timeout cancels any in-flight store call.
    pub async fn collect(
        store: &dyn EntityStore,
        config: &ReportConfig,
        kind: ReportKind,
        criteria: &FilterCriteria,
    ) -> Result<ReportData, ReportError> {
        let fetch = async {
            let resolved = FilterResolver::resolve(store, kind, criteria).await?;
            let rows = Self::fetch_rows(store, resolved.query).await?;
            Ok::<_, ReportError>(ReportData {
                kind,
                filter_summary: resolved.summary,
                rows,
            })
        };

        tokio::time::timeout(config.fetch_timeout, fetch)
            .await
            .map_err(|_| StoreError::Timeout(config.fetch_timeout))?
    }

    async fn fetch_rows(
        store: &dyn EntityStore,
        query: ResolvedQuery,
    ) -> Result<ReportRows, StoreError> {
        Ok(match query {
            ResolvedQuery::Students(q) => rows::student_rows(&store.find_students(&q).await?),
            ResolvedQuery::Classes(q) => rows::class_rows(&store.find_classes(&q).await?),
            ResolvedQuery::Courses(q) => rows::course_rows(&store.find_courses(&q).await?),
            ResolvedQuery::Instructors(q) => {
                rows::instructor_rows(&store.find_instructors(&q).await?)
            }
            ResolvedQuery::Attendance(q) => {
                ReportRows::Attendance(rows::group_attendance(&store.find_attendance(&q).await?))
            }
        })
    }

    /// Renders already-fetched data. Pure; never touches the store.
    pub fn render(
        config: &ReportConfig,
        data: &ReportData,
        format: ReportFormat,
        now: DateTime<Utc>,
    ) -> Result<ReportArtifact, ReportError> {
        let bytes = match format {
            ReportFormat::Pdf => {
                let document = DocumentLayoutEngine::new(config).render(data, now)?;
                write_pdf(&document)
                    .map_err(|e| ReportError::internal(data.kind.slug(), "pdf", None, e))?
            }
            ReportFormat::Xlsx => WorkbookBuilder::new(config).build(data)?,
        };

        Ok(ReportArtifact {
            kind: data.kind,
            format,
            bytes,
        })
    }
}
