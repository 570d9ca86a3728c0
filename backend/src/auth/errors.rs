//! Custom error types specific to authentication failures.
//!
//! This module defines the errors that can occur during authentication and
//! authorization, along with the HTTP status each one maps to.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    MissingToken,
    #[error("session is invalid")]
    InvalidToken,
    #[error("session has expired")]
    ExpiredToken,
    #[error("account is deactivated")]
    AccountDisabled,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token encoding failed: {0}")]
    TokenEncoding(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
            AuthError::Hashing(_) | AuthError::TokenEncoding(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::MissingToken => "unauthenticated",
            AuthError::InvalidToken => "invalid_session",
            AuthError::ExpiredToken => "session_expired",
            AuthError::AccountDisabled => "account_disabled",
            AuthError::Forbidden => "forbidden",
            AuthError::WeakPassword(_) => "weak_password",
            AuthError::Hashing(_) | AuthError::TokenEncoding(_) => "internal_error",
        }
    }
}
