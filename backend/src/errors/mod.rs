//! Global application error types and handlers.
//!
//! This module defines the error type used across the entire backend application
//! and the mapping that turns every failure into a consistent JSON response.

use adapters::AdapterError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::ffi;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::services::workflow::WorkflowError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("file exceeds the {0} byte upload limit")]
    PayloadTooLarge(usize),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("database error: {0}")]
    Database(rusqlite::Error),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Auth(err) => err.status_code(),
            AppError::Workflow(err) => err.status_code(),
            AppError::Adapter(err) if err.is_client_error() => StatusCode::NOT_FOUND,
            AppError::Adapter(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_failed",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Forbidden(_) => "forbidden",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Auth(err) => err.code(),
            AppError::Workflow(err) => err.code(),
            AppError::Adapter(_) => "widget_unavailable",
            AppError::Database(_) => "database_error",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &err {
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return AppError::conflict("resource already exists");
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return AppError::conflict("resource is referenced by other records");
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Internal details stay in the log.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": {
                "code": self.code(),
                "message": message,
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute_batch("CREATE TABLE t (v TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .expect("seed");
        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .expect_err("duplicate insert must fail");
        let app: AppError = err.into();
        assert_eq!(app.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn server_errors_hide_details() {
        let response = AppError::Internal("secret detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn adapter_client_errors_are_not_found() {
        let err: AppError = AdapterError::UnknownCity("x".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let err: AppError = AdapterError::Unavailable("down".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
