//! Inference Engine - Fixed-architecture MLP forward pass
//!
//! Network: 115 → 128 (ReLU) → 64 (ReLU) → 1, logistic output.
//!
//! Weights are exported from the trained module's state dict as JSON, one
//! entry per linear layer (`fc1`, `fc2`, `fc3`) with `weight` laid out as
//! `[out][in]` and `bias` as `[out]`.
//!
//! Only the evaluation-mode forward pass exists here: dropout
//! ([`DROPOUT_RATE`]) is a training-time layer and is the identity at
//! inference, and no parameter is ever written after construction.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::assets::AssetError;
use crate::error::DetectorError;
use crate::features::{validate_layout, FEATURE_COUNT, FEATURE_VERSION};

// ============================================================================
// ARCHITECTURE
// ============================================================================

pub const INPUT_SIZE: usize = FEATURE_COUNT;
pub const HIDDEN_SIZE_1: usize = 128;
pub const HIDDEN_SIZE_2: usize = 64;
pub const OUTPUT_SIZE: usize = 1;

/// Dropout rate the saved weights were trained with (not applied here)
pub const DROPOUT_RATE: f32 = 0.3;

/// Architecture summary for diagnostics endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Architecture {
    pub input_size: usize,
    pub hidden_size_1: usize,
    pub hidden_size_2: usize,
    pub output_size: usize,
    pub dropout_rate: f32,
}

impl Architecture {
    pub const fn current() -> Self {
        Self {
            input_size: INPUT_SIZE,
            hidden_size_1: HIDDEN_SIZE_1,
            hidden_size_2: HIDDEN_SIZE_2,
            output_size: OUTPUT_SIZE,
            dropout_rate: DROPOUT_RATE,
        }
    }
}

// ============================================================================
// SERIALIZED WEIGHTS
// ============================================================================

/// One linear layer as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerWeights {
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LayerWeights {
    /// All-zero layer of the given shape
    pub fn zeros(out_dim: usize, in_dim: usize) -> Self {
        Self {
            weight: vec![vec![0.0; in_dim]; out_dim],
            bias: vec![0.0; out_dim],
        }
    }
}

/// Classifier weights as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierWeights {
    pub fc1: LayerWeights,
    pub fc2: LayerWeights,
    pub fc3: LayerWeights,
    /// Feature layout version the model was trained on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_version: Option<u8>,
    /// Feature layout hash the model was trained on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
}

impl ClassifierWeights {
    /// Zero weights with the fixed architecture's shapes
    pub fn zeros() -> Self {
        Self {
            fc1: LayerWeights::zeros(HIDDEN_SIZE_1, INPUT_SIZE),
            fc2: LayerWeights::zeros(HIDDEN_SIZE_2, HIDDEN_SIZE_1),
            fc3: LayerWeights::zeros(OUTPUT_SIZE, HIDDEN_SIZE_2),
            feature_version: None,
            layout_hash: None,
        }
    }
}

// ============================================================================
// NETWORK
// ============================================================================

#[derive(Debug, Clone)]
struct DenseLayer {
    /// `[in][out]`, transposed once at load time
    weight_t: Array2<f32>,
    bias: Array1<f32>,
}

impl DenseLayer {
    fn from_weights(
        name: &str,
        layer: LayerWeights,
        in_dim: usize,
        out_dim: usize,
    ) -> Result<Self, AssetError> {
        if layer.weight.len() != out_dim {
            return Err(AssetError::Shape(format!(
                "{}.weight has {} rows, expected {}",
                name,
                layer.weight.len(),
                out_dim
            )));
        }
        if let Some(row) = layer.weight.iter().position(|r| r.len() != in_dim) {
            return Err(AssetError::Shape(format!(
                "{}.weight row {} has {} columns, expected {}",
                name,
                row,
                layer.weight[row].len(),
                in_dim
            )));
        }
        if layer.bias.len() != out_dim {
            return Err(AssetError::Shape(format!(
                "{}.bias has {} entries, expected {}",
                name,
                layer.bias.len(),
                out_dim
            )));
        }

        let flat: Vec<f32> = layer.weight.into_iter().flatten().collect();
        if flat.iter().chain(&layer.bias).any(|v| !v.is_finite()) {
            return Err(AssetError::Shape(format!(
                "{} contains non-finite parameters",
                name
            )));
        }

        let weight = Array2::from_shape_vec((out_dim, in_dim), flat)
            .map_err(|e| AssetError::Shape(format!("{}.weight: {}", name, e)))?;

        Ok(Self {
            weight_t: weight.reversed_axes(),
            bias: Array1::from_vec(layer.bias),
        })
    }

    fn input_size(&self) -> usize {
        self.weight_t.nrows()
    }

    fn forward(&self, x: ArrayView2<'_, f32>) -> Array2<f32> {
        x.dot(&self.weight_t) + &self.bias
    }
}

/// Feed-forward botnet detector in evaluation mode
#[derive(Debug, Clone)]
pub struct MlpDetector {
    fc1: DenseLayer,
    fc2: DenseLayer,
    fc3: DenseLayer,
}

impl MlpDetector {
    /// Build the network from saved weights, validating every shape
    pub fn from_weights(weights: ClassifierWeights) -> Result<Self, AssetError> {
        if let Some(hash) = weights.layout_hash {
            let version = weights.feature_version.unwrap_or(FEATURE_VERSION);
            validate_layout(version, hash)?;
        }

        Ok(Self {
            fc1: DenseLayer::from_weights("fc1", weights.fc1, INPUT_SIZE, HIDDEN_SIZE_1)?,
            fc2: DenseLayer::from_weights("fc2", weights.fc2, HIDDEN_SIZE_1, HIDDEN_SIZE_2)?,
            fc3: DenseLayer::from_weights("fc3", weights.fc3, HIDDEN_SIZE_2, OUTPUT_SIZE)?,
        })
    }

    /// Raw logits, one per row. All rows go through the same matrix products.
    pub fn forward(&self, x: ArrayView2<'_, f32>) -> Result<Array1<f32>, DetectorError> {
        if x.ncols() != self.fc1.input_size() {
            return Err(DetectorError::Inference(format!(
                "input has {} columns, model expects {}",
                x.ncols(),
                self.fc1.input_size()
            )));
        }

        ensure_finite("input", &x)?;

        // ReLU maps NaN to 0, so pre-activations are checked before it runs
        let mut h1 = self.fc1.forward(x);
        ensure_finite("fc1", &h1.view())?;
        h1.mapv_inplace(relu);
        let mut h2 = self.fc2.forward(h1.view());
        ensure_finite("fc2", &h2.view())?;
        h2.mapv_inplace(relu);
        let out = self.fc3.forward(h2.view());

        Ok(out.column(0).to_owned())
    }

    /// Probability of attack per row
    pub fn predict_proba(&self, x: ArrayView2<'_, f32>) -> Result<Array1<f32>, DetectorError> {
        let probabilities = self.forward(x)?.mapv(sigmoid);

        if let Some(row) = probabilities.iter().position(|p| !p.is_finite()) {
            return Err(DetectorError::Inference(format!(
                "non-finite probability for row {}",
                row
            )));
        }
        Ok(probabilities)
    }
}

fn ensure_finite(stage: &str, values: &ArrayView2<'_, f32>) -> Result<(), DetectorError> {
    match values.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, column), _)) => Err(DetectorError::Inference(format!(
            "non-finite {} value at row {}, column {}",
            stage, row, column
        ))),
        None => Ok(()),
    }
}

fn relu(v: f32) -> f32 {
    v.max(0.0)
}

/// Logistic function, evaluated without overflowing for large |z|
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::layout_hash;

    /// logit = max(x[0], 0) + bias
    fn gate_weights(bias: f32) -> ClassifierWeights {
        let mut weights = ClassifierWeights::zeros();
        weights.fc1.weight[0][0] = 1.0;
        weights.fc2.weight[0][0] = 1.0;
        weights.fc3.weight[0][0] = 1.0;
        weights.fc3.bias[0] = bias;
        weights
    }

    fn batch(first_features: &[f32]) -> Array2<f32> {
        let mut x = Array2::zeros((first_features.len(), INPUT_SIZE));
        for (i, v) in first_features.iter().enumerate() {
            x[[i, 0]] = *v;
        }
        x
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(100.0) <= 1.0);
        assert!(sigmoid(-100.0) >= 0.0);
        assert!(sigmoid(-1000.0).is_finite());
        assert!(sigmoid(2.0) > 0.5);
    }

    #[test]
    fn test_forward_matches_hand_computation() {
        let model = MlpDetector::from_weights(gate_weights(-1.0)).unwrap();
        let logits = model.forward(batch(&[3.0, 0.5, -2.0]).view()).unwrap();

        assert_eq!(logits.len(), 3);
        assert!((logits[0] - 2.0).abs() < 1e-6);
        assert!((logits[1] + 0.5).abs() < 1e-6);
        assert!((logits[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_rows_are_independent() {
        let model = MlpDetector::from_weights(gate_weights(-1.0)).unwrap();
        let values = [3.0, 0.5, -2.0, 1.25];

        let together = model.predict_proba(batch(&values).view()).unwrap();
        for (i, v) in values.iter().enumerate() {
            let alone = model.predict_proba(batch(&[*v]).view()).unwrap();
            assert_eq!(alone[0], together[i]);
        }
    }

    #[test]
    fn test_zero_model_scores_exactly_half() {
        let model = MlpDetector::from_weights(ClassifierWeights::zeros()).unwrap();
        let p = model.predict_proba(batch(&[5.0]).view()).unwrap();
        assert_eq!(p[0], 0.5);
    }

    #[test]
    fn test_rejects_wrong_layer_shape() {
        let mut weights = ClassifierWeights::zeros();
        weights.fc2.weight.pop();
        let err = MlpDetector::from_weights(weights).unwrap_err();
        assert!(err.to_string().contains("fc2.weight"));

        let mut weights = ClassifierWeights::zeros();
        weights.fc1.weight[5].push(0.0);
        assert!(MlpDetector::from_weights(weights).is_err());

        let mut weights = ClassifierWeights::zeros();
        weights.fc3.bias.push(0.0);
        assert!(MlpDetector::from_weights(weights).is_err());
    }

    #[test]
    fn test_rejects_non_finite_parameters() {
        let mut weights = ClassifierWeights::zeros();
        weights.fc1.bias[0] = f32::NAN;
        assert!(matches!(
            MlpDetector::from_weights(weights),
            Err(AssetError::Shape(_))
        ));
    }

    #[test]
    fn test_layout_fingerprint_checked() {
        let mut weights = ClassifierWeights::zeros();
        weights.layout_hash = Some(layout_hash());
        assert!(MlpDetector::from_weights(weights.clone()).is_ok());

        weights.layout_hash = Some(layout_hash().wrapping_add(1));
        assert!(matches!(
            MlpDetector::from_weights(weights),
            Err(AssetError::Layout(_))
        ));
    }

    #[test]
    fn test_forward_rejects_non_finite_input() {
        let model = MlpDetector::from_weights(gate_weights(0.0)).unwrap();
        let x = batch(&[f32::INFINITY]);
        assert!(matches!(
            model.predict_proba(x.view()),
            Err(DetectorError::Inference(_))
        ));
    }

    #[test]
    fn test_hidden_overflow_is_not_masked_by_relu() {
        let mut weights = gate_weights(0.0);
        weights.fc1.weight[0][1] = 1.0;
        let model = MlpDetector::from_weights(weights).unwrap();

        // 3e38 + 3e38 overflows f32 in the first layer
        let mut x = batch(&[3.0e38]);
        x[[0, 1]] = 3.0e38;
        let err = model.predict_proba(x.view()).unwrap_err();
        assert!(err.to_string().contains("fc1"));
    }

    #[test]
    fn test_forward_rejects_wrong_width() {
        let model = MlpDetector::from_weights(ClassifierWeights::zeros()).unwrap();
        let x = Array2::<f32>::zeros((2, 3));
        assert!(matches!(
            model.forward(x.view()),
            Err(DetectorError::Inference(_))
        ));
    }
}
