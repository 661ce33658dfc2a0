//! Prediction request/response models

use nbaiot_detector_core::EngineStatsSnapshot;
use serde::{Deserialize, Serialize};

pub use nbaiot_detector_core::PredictionResult;

/// Single-instance request body
///
/// `features` must deserialize as a list of numbers; a non-numeric entry is
/// a schema violation rejected by the JSON extractor. The length is checked
/// against the model input size by the detector.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiDocs {
    pub version: &'static str,
    pub endpoints: &'static [EndpointDoc],
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
    pub model_loaded: bool,
    pub engine: EngineStatsSnapshot,
}
