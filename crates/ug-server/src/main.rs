//! Upload Gateway Server
//!
//! HTTP server that validates uploads and forwards them to the configured
//! transfer backend.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ug_api::AppState;
use ug_core::config::{AppConfig, TransferBackend};
use ug_uploads::{
    FtpTransferClient, LocalTransferClient, MemoryTransferClient, TransferClient,
    UnavailableTransferClient, UploadPolicy, UploadService,
};

mod health;

use health::{HealthChecker, HealthConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}, using defaults", e);
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.transfer.backend,
        "Starting Upload Gateway"
    );

    let policy = Arc::new(UploadPolicy::from_config(&config));
    let missing = policy.missing_sections();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Upload policy incomplete; uploads will be rejected");
    }

    let transfer = build_transfer(&config, &policy);
    let state = AppState::new(UploadService::new(policy, transfer));
    let health = Arc::new(HealthChecker::new(HealthConfig::default(), state.uploads.clone()));

    let app = build_router(state, health, config.server.max_body_size_bytes);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,ug_server=debug,ug_api=debug,ug_uploads=debug,tower_http=debug".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Pick the transfer backend named in the configuration
fn build_transfer(config: &AppConfig, policy: &UploadPolicy) -> Arc<dyn TransferClient> {
    match config.transfer.backend {
        TransferBackend::Ftp => match policy.endpoint() {
            Some(endpoint) => Arc::new(FtpTransferClient::new(endpoint.clone())),
            None => Arc::new(UnavailableTransferClient::new("ftp", "FTP endpoint is not configured")),
        },
        TransferBackend::Local => Arc::new(LocalTransferClient::new(&config.transfer.local_root)),
        TransferBackend::Memory => Arc::new(MemoryTransferClient::new()),
    }
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, max_body_size: usize) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    Router::new()
        .merge(health_routes)
        .merge(ug_api::router().with_state(state))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
