//! Feature Normalizer - Fitted per-column affine transform
//!
//! The scaler is fitted by the training pipeline and shipped as JSON.
//! Both supported kinds reduce to `(x - center) / scale` per column.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::assets::AssetError;
use crate::error::DetectorError;
use crate::features::{FeatureMatrix, FEATURE_COUNT};

/// Scales smaller than this are treated as 1.0 (constant columns)
const MIN_SCALE: f64 = 10.0 * f64::EPSILON;

// ============================================================================
// SERIALIZED PARAMETERS
// ============================================================================

/// Scaler parameters as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// Standardization: `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// Min-max: `(x - data_min) / (data_max - data_min)`
    MinMax { data_min: Vec<f64>, data_max: Vec<f64> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    Standard,
    MinMax,
}

impl ScalerParams {
    /// Identity standardization, handy for tests and smoke deployments
    pub fn identity() -> Self {
        ScalerParams::Standard {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        }
    }

    pub fn kind(&self) -> ScalerKind {
        match self {
            ScalerParams::Standard { .. } => ScalerKind::Standard,
            ScalerParams::MinMax { .. } => ScalerKind::MinMax,
        }
    }
}

// ============================================================================
// FITTED SCALER
// ============================================================================

/// Immutable fitted scaler, shared read-only by every request
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    kind: ScalerKind,
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl FeatureScaler {
    pub fn from_params(params: ScalerParams) -> Result<Self, AssetError> {
        let kind = params.kind();
        let (center, scale) = match params {
            ScalerParams::Standard { mean, scale } => {
                check_params("mean", &mean)?;
                check_params("scale", &scale)?;
                (mean, scale)
            }
            ScalerParams::MinMax { data_min, data_max } => {
                check_params("data_min", &data_min)?;
                check_params("data_max", &data_max)?;
                let range = data_max
                    .iter()
                    .zip(&data_min)
                    .map(|(max, min)| max - min)
                    .collect();
                (data_min, range)
            }
        };

        let scale = scale
            .into_iter()
            .map(|s| if s.abs() < MIN_SCALE { 1.0 } else { s })
            .collect::<Vec<_>>();

        Ok(Self {
            kind,
            center: Array1::from_vec(center),
            scale: Array1::from_vec(scale),
        })
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    pub fn width(&self) -> usize {
        self.center.len()
    }

    /// Apply the per-column transform to every row
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix, DetectorError> {
        if matrix.width() != self.width() {
            return Err(DetectorError::Normalization(format!(
                "matrix has {} columns, scaler was fitted on {}",
                matrix.width(),
                self.width()
            )));
        }

        let scaled = (&matrix.view() - &self.center) / &self.scale;
        Ok(FeatureMatrix::from_array(scaled))
    }
}

fn check_params(name: &str, values: &[f64]) -> Result<(), AssetError> {
    if values.len() != FEATURE_COUNT {
        return Err(AssetError::Shape(format!(
            "scaler `{}` has {} entries, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(AssetError::Shape(format!(
            "scaler `{}` entry {} is not finite",
            name, i
        )));
    }
    Ok(())
}
