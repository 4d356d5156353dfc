//! HTTP error responses.
//!
//! Every failure is returned as `{ "error", "message", "details"? }` JSON.
//! Internal errors are logged and replaced by a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{BatchError, RowError, RowProblem};
use crate::report::ReportError;
use crate::storage::StorageError;

/// Message shown when a form field is not a number.
pub const INVALID_INPUT: &str = "Invalid input! Please enter numeric values.";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<RowErrorDetail>>,
}

/// One failing row of an uploaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowErrorDetail {
    pub row: usize,
    /// Which measurement failed; absent for model domain errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
}

impl From<&RowError> for RowErrorDetail {
    fn from(e: &RowError) -> Self {
        let (field, value) = match e {
            RowError::Invalid(v) => {
                let value = match &v.problem {
                    RowProblem::Missing => None,
                    RowProblem::NotNumeric { value } => Some(value.clone()),
                };
                (Some(v.field.clone()), value)
            }
            RowError::Domain { .. } => (None, None),
        };
        Self {
            row: e.row(),
            field,
            value,
            message: e.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 400 with per-row diagnostics
    InvalidRows(String, Vec<RowErrorDetail>),
    /// 404
    NotFound(String),
    /// 422
    Unprocessable(String),
    /// 500
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Log the real cause; the client sees a generic message.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", e);
        Self::Internal("Internal server error".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, details) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m, None),
            ApiError::InvalidRows(m, rows) => {
                (StatusCode::BAD_REQUEST, "invalid_rows", m, Some(rows))
            }
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m, None),
            ApiError::Unprocessable(m) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "domain_error", m, None)
            }
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", m, None),
        };

        let body = ErrorResponse {
            error,
            message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(name) => Self::not_found(format!("File not found: {}", name)),
            StorageError::NotAllowed(_) | StorageError::UnsafeName(_) => {
                tracing::warn!("Rejected upload: {}", e);
                Self::bad_request(e.to_string())
            }
            StorageError::Io(_) => Self::internal(e),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Storage(e) => e.into(),
            ReportError::Table(e) => {
                tracing::warn!("Unreadable upload: {}", e);
                Self::bad_request(format!("Error processing file: {}", e))
            }
            ReportError::Batch(BatchError::InvalidRows(rows)) => {
                let message = format!("Error processing file: {}", BatchError::InvalidRows(rows.clone()));
                tracing::warn!("{}", message);
                Self::InvalidRows(message, rows.iter().map(RowErrorDetail::from).collect())
            }
            ReportError::Batch(e) => {
                tracing::warn!("Rejected upload: {}", e);
                Self::bad_request(format!("Error processing file: {}", e))
            }
            ReportError::Export(e) => Self::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainError, RowValidationError};

    #[test]
    fn row_detail_carries_field_and_value() {
        let e = RowError::from(RowValidationError {
            row: 2,
            field: "Height".to_string(),
            problem: RowProblem::NotNumeric {
                value: "abc".to_string(),
            },
        });
        let detail = RowErrorDetail::from(&e);
        assert_eq!(detail.row, 2);
        assert_eq!(detail.field.as_deref(), Some("Height"));
        assert_eq!(detail.value.as_deref(), Some("abc"));
    }

    #[test]
    fn domain_detail_has_no_field() {
        let e = RowError::Domain {
            row: 0,
            source: DomainError {
                circumference: 1.0,
                height: -1.0,
                base: -0.1,
            },
        };
        let detail = RowErrorDetail::from(&e);
        assert!(detail.field.is_none());
        assert!(detail.message.starts_with("row 0:"));
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError::from(StorageError::NotFound("x.csv".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
