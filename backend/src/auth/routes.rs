//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle company registration, login, logout, the current session
//! and password changes. They are nested under `/api/auth` by the main router.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{change_password, login, logout, me, register_company};
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_company))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password", post(change_password))
}
