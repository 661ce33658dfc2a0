//! Model Module - Scaler, classifier and decision threshold
//!
//! - `normalization` - fitted per-column scaler
//! - `inference` - evaluation-mode MLP forward pass
//! - `threshold` - probability to label/status

pub mod inference;
pub mod normalization;
pub mod threshold;

// Re-export common types
pub use inference::{
    Architecture, ClassifierWeights, LayerWeights, MlpDetector, DROPOUT_RATE, HIDDEN_SIZE_1,
    HIDDEN_SIZE_2, INPUT_SIZE, OUTPUT_SIZE,
};
pub use normalization::{FeatureScaler, ScalerKind, ScalerParams};
pub use threshold::{PredictionResult, TrafficStatus, ATTACK_THRESHOLD};
