//! N-BaIoT Botnet Detector API Server
//!
//! Serves the pre-trained botnet classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    N-BaIoT DETECTOR API                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────────────────────────────┐   │
//! │  │  Router   │  │  Detector (nbaiot-detector-core)      │   │
//! │  │  (Axum)   │─▶│  gate → validate → scale → MLP → label│   │
//! │  └───────────┘  └───────────────────┬───────────────────┘   │
//! │                                     ▼                       │
//! │                      ┌──────────────────────────────┐      │
//! │                      │ saved_assets/ (scaler, model)│      │
//! │                      └──────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;


use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use nbaiot_detector_core::Detector;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    init_tracing(&config);

    tracing::info!("N-BaIoT Detector API starting ({})...", config.environment);

    // Load assets; refuse to serve without both
    tracing::info!("Scaler: {}", config.scaler_path.display());
    tracing::info!("Model: {}", config.model_path.display());
    let detector = Detector::load(&config.scaler_path, &config.model_path)
        .context("failed to load model assets")?;
    tracing::info!("Model and scaler loaded, service ready");

    // Build application state
    let state = AppState {
        detector: Arc::new(detector),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("N-BaIoT Detector API stopped");
    Ok(())
}

fn init_tracing(config: &config::Config) {
    let default_filter = if config.is_production() {
        "nbaiot_detector_api=info,nbaiot_detector_core=info,tower_http=info"
    } else {
        "nbaiot_detector_api=debug,nbaiot_detector_core=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Detector>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::health::welcome))
        .route("/docs", get(handlers::health::docs))
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::info))
        // Prediction
        .route("/predict/", post(handlers::predict::single))
        .route("/predict", post(handlers::predict::single))
        .route("/predict_batch/", post(handlers::predict::batch))
        .route("/predict_batch", post(handlers::predict::batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
