//! Welcome, endpoint index and health check handlers

use axum::{extract::State, Json};

use crate::models::{ApiDocs, EndpointDoc, HealthResponse, WelcomeResponse};
use crate::AppState;

pub const WELCOME_MESSAGE: &str =
    "N-BaIoT Botnet Detection API. Navigate to /docs for API documentation.";

const ENDPOINTS: &[EndpointDoc] = &[
    EndpointDoc {
        method: "GET",
        path: "/health",
        description: "Service readiness and inference counters",
    },
    EndpointDoc {
        method: "GET",
        path: "/model",
        description: "Architecture, threshold and feature layout of the served model",
    },
    EndpointDoc {
        method: "POST",
        path: "/predict/",
        description: "JSON body {\"features\": [115 numbers]}, returns one prediction",
    },
    EndpointDoc {
        method: "POST",
        path: "/predict_batch/",
        description: "Multipart field `file`: headerless 115-column CSV, one result per row",
    },
];

pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Endpoint index referenced by the welcome message
pub async fn docs() -> Json<ApiDocs> {
    Json(ApiDocs {
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.detector.is_ready();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unavailable" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded,
        engine: state.detector.stats(),
    })
}
