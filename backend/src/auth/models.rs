//! Data structures for authentication-related entities.
//!
//! This module defines the JWT claims carried by a session and the request and
//! response bodies used by the authentication endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Company, Role, User};

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Company (tenant) id.
    pub cid: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub company_name: String,
    pub slug: String,
    pub admin_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub company_slug: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
    pub company: Company,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub company: Company,
}
