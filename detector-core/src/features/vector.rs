//! Feature Vector / Feature Matrix - Validated model input
//!
//! A [`FeatureVector`] can only be built with exactly [`FEATURE_COUNT`]
//! finite values, and a [`FeatureMatrix`] is a batch of such rows sharing
//! the same width. Both are created per request and dropped with it.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::layout::FEATURE_COUNT;
use crate::error::{DetectorError, InputOrigin};

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// One instance of network-traffic statistics
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = DetectorError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        if values.len() != FEATURE_COUNT {
            return Err(DetectorError::InvalidShape {
                origin: InputOrigin::Features,
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DetectorError::NonFiniteValue { index });
        }
        Ok(Self { values })
    }
}

// ============================================================================
// FEATURE MATRIX
// ============================================================================

/// A batch of feature vectors, one row per instance, input order preserved
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Build from row-major values. The caller guarantees every value is finite.
    pub(crate) fn from_row_major(rows: usize, values: Vec<f64>) -> Result<Self, DetectorError> {
        if rows == 0 {
            return Err(DetectorError::EmptyInput);
        }
        let data = Array2::from_shape_vec((rows, FEATURE_COUNT), values).map_err(|e| {
            DetectorError::MalformedInput(format!("inconsistent row width: {}", e))
        })?;
        Ok(Self { data })
    }

    /// Number of instances
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of features per instance
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub(crate) fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }
}

impl From<FeatureVector> for FeatureMatrix {
    fn from(vector: FeatureVector) -> Self {
        let data = Array1::from_vec(vector.into_inner()).insert_axis(Axis(0));
        Self { data }
    }
}
