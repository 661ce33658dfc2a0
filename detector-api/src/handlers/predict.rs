//! Prediction handlers

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    Json,
};

use crate::models::{PredictRequest, PredictionResult};
use crate::{AppError, AppResult, AppState};

/// Multipart field carrying the CSV upload
pub const UPLOAD_FIELD: &str = "file";

/// Predict botnet attack for one feature vector
pub async fn single(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    state.detector.ensure_ready()?;
    let Json(req) = payload?;

    let result = state.detector.predict_one(req.features)?;
    tracing::debug!(
        "Single prediction: {} (p = {:.4})",
        result.status,
        result.probability_attack
    );

    Ok(Json(result))
}

/// Predict every row of an uploaded CSV file
pub async fn batch(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Vec<PredictionResult>>> {
    state.detector.ensure_ready()?;
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        state.detector.accept_upload(&file_name)?;

        let contents = field.bytes().await?;
        tracing::info!("Batch upload received: {} ({} bytes)", file_name, contents.len());

        let detector = Arc::clone(&state.detector);
        let results = tokio::task::spawn_blocking(move || detector.predict_csv(&contents))
            .await
            .map_err(|e| AppError::InternalError(format!("Batch task failed: {}", e)))??;

        let attacks = results.iter().filter(|r| r.is_attack()).count();
        tracing::info!("Batch scored: {} rows, {} attacks", results.len(), attacks);

        return Ok(Json(results));
    }

    Err(AppError::MissingUpload)
}
