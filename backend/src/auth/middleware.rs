//! Middleware for protecting authenticated routes and handling authorization.
//!
//! Authentication is an extractor: any handler that takes an [`AuthUser`] only
//! runs for requests carrying a valid session token whose user is still active.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

use super::errors::AuthError;
use crate::database::models::{Role, UserRecord};
use crate::database::queries;
use crate::errors::AppError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "procurement_session";

/// The authenticated caller, reloaded from the database on every request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub record: UserRecord,
}

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.record.id
    }

    pub fn company_id(&self) -> i64 {
        self.record.company_id
    }

    pub fn role(&self) -> Role {
        self.record.role
    }

    pub fn department_id(&self) -> Option<i64> {
        self.record.department_id
    }

    pub fn is_admin(&self) -> bool {
        self.record.role == Role::Admin
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), AuthError> {
        if roles.contains(&self.record.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> Result<(), AuthError> {
        self.require_any(&[Role::Admin])
    }
}

/// Bearer header wins over the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = state.keys.verify(&token)?;

        let record = state
            .db
            .call(move |conn| Ok(queries::get_user(conn, claims.cid, claims.sub)?))
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !record.active {
            return Err(AuthError::AccountDisabled.into());
        }

        tracing::Span::current().record("user_id", record.id);
        Ok(Self { record })
    }
}
