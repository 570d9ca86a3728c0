//! Procurement approval service.
//!
//! Companies register, invite their staff and route purchase requests through
//! a fixed approval chain (department manager, IT, finance, purchasing). The
//! crate exposes the axum router and shared state so the binary and the
//! integration tests assemble the same application.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;
pub mod utils;

use std::sync::Arc;

use adapters::{ExchangeRateProvider, FixedRateProvider, StaticWeatherProvider, WeatherProvider};
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::api::dashboard::routes::{calendar_router, dashboard_router, todos_router, widgets_router};
use crate::api::departments::routes::departments_router;
use crate::api::notifications::routes::notifications_router;
use crate::api::products::routes::products_router;
use crate::api::requests::routes::{attachments_router, requests_router};
use crate::api::users::routes::users_router;
use crate::auth::{auth_router, JwtKeys};
use crate::config::{AppConfig, LogFormat};
use crate::database::Database;
use crate::services::storage::AttachmentStore;

/// Headroom on top of the per-file limit for multipart framing.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
const DEFAULT_LOG_FILTER: &str = "info,procurement_backend=debug";

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub keys: Arc<JwtKeys>,
    pub storage: AttachmentStore,
    pub weather: Arc<dyn WeatherProvider>,
    pub rates: Arc<dyn ExchangeRateProvider>,
}

impl AppState {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self::with_providers(
            config,
            db,
            Arc::new(StaticWeatherProvider::new()),
            Arc::new(FixedRateProvider::new()),
        )
    }

    pub fn with_providers(
        config: AppConfig,
        db: Database,
        weather: Arc<dyn WeatherProvider>,
        rates: Arc<dyn ExchangeRateProvider>,
    ) -> Self {
        let keys = JwtKeys::new(&config.jwt_secret, config.jwt_ttl);
        let storage = AttachmentStore::new(config.upload_dir.clone());
        Self {
            db,
            config: Arc::new(config),
            keys: Arc::new(keys),
            storage,
            weather,
            rates,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    let api = Router::new()
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/departments", departments_router())
        .nest("/products", products_router())
        .nest("/requests", requests_router())
        .nest("/attachments", attachments_router())
        .nest("/notifications", notifications_router())
        .nest("/dashboard", dashboard_router())
        .nest("/todos", todos_router())
        .nest("/calendar", calendar_router())
        .nest("/widgets", widgets_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
        .with_state(state)
}

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
