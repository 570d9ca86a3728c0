//! Main entry point for the procurement service.
//!
//! Loads configuration from the environment, prepares the database and the
//! upload directory, then serves the API until Ctrl-C.

use std::process::ExitCode;

use procurement_backend::config::AppConfig;
use procurement_backend::database::{seed, Database};
use procurement_backend::errors::AppResult;
use procurement_backend::{build_router, init_tracing, AppState};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    let db = Database::open(&config.database_path)?;
    db.migrate().await?;
    if config.seed_demo {
        seed::seed_demo(&db).await?;
    }
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let addr = config.bind_addr;
    let app = build_router(AppState::new(config, db));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "procurement service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("procurement service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
