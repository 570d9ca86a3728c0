//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for company registration, login,
//! logout and password changes, and delegate the core logic to `auth::service`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::middleware::{AuthUser, SESSION_COOKIE};
use super::models::{
    ChangePasswordRequest, LoginRequest, MeResponse, RegisterCompanyRequest, SessionResponse,
};
use super::service;
use crate::database::models::{Company, User, UserRecord};
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::AppState;

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .build()
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    company: Company,
    user: &UserRecord,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let (token, expires_at) = state.keys.issue(user)?;
    let jar = jar.add(session_cookie(state, token.clone()));
    Ok((
        jar,
        Json(SessionResponse {
            token,
            expires_at,
            user: User::from(user),
            company,
        }),
    ))
}

pub async fn register_company(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterCompanyRequest>,
) -> AppResult<impl IntoResponse> {
    let (company, admin) = service::register_company(&state.db, &body).await?;
    let (jar, session) = start_session(&state, jar, company, &admin)?;
    Ok((StatusCode::CREATED, jar, session))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (company, user) = service::login(&state.db, &body).await?;
    start_session(&state, jar, company, &user)
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let company_id = auth.company_id();
    let company = state
        .db
        .call(move |conn| Ok(queries::get_company(conn, company_id)?))
        .await?
        .ok_or(AppError::NotFound("company"))?;
    Ok(Json(MeResponse {
        user: User::from(&auth.record),
        company,
    }))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    service::change_password(&state.db, &auth.record, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}
