//! Model info handler

use axum::{extract::State, Json};
use nbaiot_detector_core::ModelInfo;

use crate::{AppResult, AppState};

/// Architecture, threshold and feature layout of the served model
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    Ok(Json(state.detector.model_info()?))
}
