//! Error types for report generation and their HTTP mapping.
//!
//! [`ReportError`] is the taxonomy the reporting core raises. [`AppError`] is the
//! envelope handlers return; every `ReportError` converts into it with the matching
//! status code.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;

/// Failure while fetching entities from the backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Query(#[source] Error),

    /// A fetched row could not be turned into a valid DTO.
    #[error("invalid {entity} record {id}: {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: i64,
        reason: String,
    },

    #[error("store fetch timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    pub fn query<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::Query(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A filter required by the requested report shape is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A filter references an entity id that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected fault after a successful fetch.
    #[error("internal fault in {report} report during {stage}{}: {source}", record_suffix(.record))]
    Internal {
        report: String,
        stage: &'static str,
        record: Option<usize>,
        #[source]
        source: Error,
    },
}

fn record_suffix(record: &Option<usize>) -> String {
    record
        .map(|idx| format!(" (record {})", idx))
        .unwrap_or_default()
}

impl ReportError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn internal<E>(
        report: impl Into<String>,
        stage: &'static str,
        record: Option<usize>,
        err: E,
    ) -> Self
    where
        E: Into<Error>,
    {
        Self::Internal {
            report: report.into(),
            stage,
            record,
            source: err.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Store(_) => "store",
            Self::Internal { .. } => "internal",
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        Self::new(err.status(), err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        ReportError::Store(err).into()
    }
}
