//! Detector - Readiness gate + inference request pipeline
//!
//! `Detector` is created once at startup and shared behind an `Arc`. Every
//! request goes through the same steps:
//!
//! 1. readiness gate (assets loaded?)
//! 2. request validation (shape / numeric contracts)
//! 3. normalization with the fitted scaler
//! 4. one vectorised forward pass over all rows
//! 5. probability → label/status, one result per row, input order

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::assets::{AssetError, AssetMetadata, AssetStore, LoadedAssets};
use crate::dataset;
use crate::error::DetectorError;
use crate::features::{FeatureMatrix, FeatureVector, LayoutInfo};
use crate::model::inference::Architecture;
use crate::model::threshold;
use crate::model::{PredictionResult, ScalerKind, ATTACK_THRESHOLD};

// ============================================================================
// ENGINE STATS
// ============================================================================

/// Counters updated by every successful scoring pass
#[derive(Debug, Default)]
pub struct EngineStats {
    inference_count: AtomicU64,
    rows_scored: AtomicU64,
    latency_sum_us: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineStatsSnapshot {
    pub inference_count: u64,
    pub rows_scored: u64,
    pub avg_latency_ms: f64,
}

impl EngineStats {
    fn record(&self, rows: usize, latency_us: u64) {
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.rows_scored.fetch_add(rows as u64, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        let count = self.inference_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg_latency_ms = if count > 0 {
            (sum as f64 / count as f64) / 1000.0
        } else {
            0.0
        };

        EngineStatsSnapshot {
            inference_count: count,
            rows_scored: self.rows_scored.load(Ordering::Relaxed),
            avg_latency_ms,
        }
    }
}

// ============================================================================
// MODEL INFO
// ============================================================================

/// Static description of the served model
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub architecture: Architecture,
    pub attack_threshold: f32,
    pub layout: LayoutInfo,
    pub scaler_kind: ScalerKind,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// DETECTOR
// ============================================================================

#[derive(Debug, Default)]
pub struct Detector {
    store: AssetStore,
    stats: EngineStats,
}

impl Detector {
    pub fn new(store: AssetStore) -> Self {
        Self {
            store,
            stats: EngineStats::default(),
        }
    }

    /// Load both artifacts; fails if either is missing or invalid
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, AssetError> {
        AssetStore::load(scaler_path, model_path).map(Self::new)
    }

    pub fn with_assets(assets: LoadedAssets) -> Self {
        Self::new(AssetStore::with_assets(assets))
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// Readiness gate, checked before any validation or computation
    pub fn ensure_ready(&self) -> Result<(), DetectorError> {
        if self.store.is_ready() {
            Ok(())
        } else {
            Err(DetectorError::NotReady)
        }
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn metadata(&self) -> Option<&AssetMetadata> {
        self.store.metadata()
    }

    pub fn model_info(&self) -> Result<ModelInfo, DetectorError> {
        let metadata = self.store.metadata().ok_or(DetectorError::NotReady)?;
        Ok(ModelInfo {
            architecture: Architecture::current(),
            attack_threshold: ATTACK_THRESHOLD,
            layout: LayoutInfo::current(),
            scaler_kind: metadata.scaler_kind,
            loaded_at: metadata.loaded_at,
        })
    }

    // ------------------------------------------------------------------------
    // Request paths
    // ------------------------------------------------------------------------

    /// Score a single feature list
    pub fn predict_one(&self, features: Vec<f64>) -> Result<PredictionResult, DetectorError> {
        self.ensure_ready()?;
        let vector = FeatureVector::try_from(features)?;

        self.predict_matrix(&FeatureMatrix::from(vector))?
            .pop()
            .ok_or_else(|| DetectorError::Inference("model produced no output".to_string()))
    }

    /// Gate + file-name check for a batch upload, before its body is read
    pub fn accept_upload(&self, file_name: &str) -> Result<(), DetectorError> {
        self.ensure_ready()?;
        dataset::check_file_name(file_name)
    }

    /// Score every row of a buffered CSV upload
    pub fn predict_csv(&self, contents: &[u8]) -> Result<Vec<PredictionResult>, DetectorError> {
        self.ensure_ready()?;
        let matrix = dataset::parse_feature_matrix(contents)?;
        self.predict_matrix(&matrix)
    }

    /// Normalize, score and label a validated batch
    pub fn predict_matrix(
        &self,
        matrix: &FeatureMatrix,
    ) -> Result<Vec<PredictionResult>, DetectorError> {
        self.ensure_ready()?;
        let start = Instant::now();

        let scaled = self.normalize(matrix)?;
        let probabilities = self.score(&scaled)?;
        if probabilities.len() != matrix.rows() {
            return Err(DetectorError::Inference(format!(
                "model returned {} probabilities for {} rows",
                probabilities.len(),
                matrix.rows()
            )));
        }

        let latency_us = start.elapsed().as_micros() as u64;
        self.stats.record(matrix.rows(), latency_us);
        log::debug!("Scored {} rows in {}us", matrix.rows(), latency_us);

        Ok(threshold::assemble(probabilities.view()))
    }

    // ------------------------------------------------------------------------
    // Pipeline stages
    // ------------------------------------------------------------------------

    /// Apply the fitted scaler to every row
    pub fn normalize(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix, DetectorError> {
        let scaler = self
            .store
            .scaler()
            .ok_or_else(|| DetectorError::Normalization("scaler not loaded".to_string()))?;
        scaler.transform(matrix)
    }

    /// Probability of attack per row, single forward pass
    pub fn score(&self, scaled: &FeatureMatrix) -> Result<ndarray::Array1<f32>, DetectorError> {
        let classifier = self
            .store
            .classifier()
            .ok_or_else(|| DetectorError::Inference("classifier not loaded".to_string()))?;

        // A finite f64 can still overflow f32 after scaling
        let input = scaled.view().mapv(|v| v as f32);
        if let Some(((row, column), _)) = input.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DetectorError::OutOfRange {
                row: row + 1,
                column: column + 1,
            });
        }

        classifier.predict_proba(input.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::features::FEATURE_COUNT;
    use crate::model::{ClassifierWeights, ScalerParams, TrafficStatus};

    /// Identity scaler, logit = max(x[0], 0) - 1
    fn gate_detector() -> Detector {
        let mut weights = ClassifierWeights::zeros();
        weights.fc1.weight[0][0] = 1.0;
        weights.fc2.weight[0][0] = 1.0;
        weights.fc3.weight[0][0] = 1.0;
        weights.fc3.bias[0] = -1.0;
        Detector::with_assets(LoadedAssets::from_parts(ScalerParams::identity(), weights).unwrap())
    }

    fn features(first: f64) -> Vec<f64> {
        let mut values = vec![0.1; FEATURE_COUNT];
        values[0] = first;
        values
    }

    fn csv_line(first: f64) -> String {
        features(first)
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_predict_one_attack_and_benign() {
        let detector = gate_detector();

        let attack = detector.predict_one(features(3.0)).unwrap();
        assert_eq!(attack.prediction_label, 1);
        assert_eq!(attack.status, TrafficStatus::Attack);
        assert!(attack.probability_attack > 0.5 && attack.probability_attack <= 1.0);

        let benign = detector.predict_one(features(0.1)).unwrap();
        assert_eq!(benign.prediction_label, 0);
        assert_eq!(benign.status, TrafficStatus::Benign);
        assert!(benign.probability_attack >= 0.0 && benign.probability_attack < 0.5);
    }

    #[test]
    fn test_predict_one_is_idempotent() {
        let detector = gate_detector();
        let first = detector.predict_one(features(1.7)).unwrap();
        let second = detector.predict_one(features(1.7)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_half_probability_is_benign() {
        // logit = max(1.0, 0) - 1 = 0
        let result = gate_detector().predict_one(features(1.0)).unwrap();
        assert_eq!(result.probability_attack, 0.5);
        assert_eq!(result.status, TrafficStatus::Benign);
    }

    #[test]
    fn test_wrong_feature_count_is_client_error() {
        let err = gate_detector().predict_one(vec![0.1; FEATURE_COUNT - 1]).unwrap_err();
        assert_eq!(err.class(), ErrorClass::ClientInput);
        assert!(err.to_string().contains("Expected 115, got 114"));
    }

    #[test]
    fn test_values_beyond_model_precision_are_rejected() {
        // fc1 unit 0 computes x[0] - x[1]; inf - inf would be NaN
        let mut weights = ClassifierWeights::zeros();
        weights.fc1.weight[0][0] = 1.0;
        weights.fc1.weight[0][1] = -1.0;
        weights.fc2.weight[0][0] = 1.0;
        weights.fc3.weight[0][0] = 1.0;
        let detector = Detector::with_assets(
            LoadedAssets::from_parts(ScalerParams::identity(), weights).unwrap(),
        );

        let mut values = features(1e300);
        values[1] = 1e300;
        let err = detector.predict_one(values).unwrap_err();
        assert!(matches!(err, DetectorError::OutOfRange { row: 1, column: 1 }));
        assert_eq!(err.class(), ErrorClass::ClientInput);
        assert_eq!(detector.stats().inference_count, 0);

        let data = [csv_line(0.5), csv_line(-1e300)].join("\n");
        let err = detector.predict_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, DetectorError::OutOfRange { row: 2, column: 1 }));
    }

    #[test]
    fn test_batch_order_matches_input_rows() {
        let detector = gate_detector();
        let firsts = [3.0, 0.0, 5.0, 0.5, 2.5];
        let data = firsts.iter().map(|f| csv_line(*f)).collect::<Vec<_>>().join("\n");

        let results = detector.predict_csv(data.as_bytes()).unwrap();
        assert_eq!(results.len(), firsts.len());
        for (result, first) in results.iter().zip(firsts) {
            let single = detector.predict_one(features(first)).unwrap();
            assert_eq!(*result, single);
        }
        assert_eq!(results[0].status, TrafficStatus::Attack);
        assert_eq!(results[1].status, TrafficStatus::Benign);
    }

    #[test]
    fn test_not_ready_detector_rejects_everything() {
        let detector = Detector::new(AssetStore::empty());
        assert!(!detector.is_ready());

        let err = detector.predict_one(features(0.0)).unwrap_err();
        assert_eq!(err.class(), ErrorClass::NotReady);

        // Gate runs before validation: wrong shapes still report NotReady
        let err = detector.predict_one(vec![]).unwrap_err();
        assert!(matches!(err, DetectorError::NotReady));
        assert!(matches!(
            detector.accept_upload("x.txt"),
            Err(DetectorError::NotReady)
        ));
        assert!(matches!(detector.predict_csv(b""), Err(DetectorError::NotReady)));
        assert!(detector.model_info().is_err());
    }

    #[test]
    fn test_stages_report_missing_assets_as_server_faults() {
        let detector = Detector::new(AssetStore::empty());
        let matrix: FeatureMatrix = FeatureVector::try_from(features(0.0)).unwrap().into();

        let err = detector.normalize(&matrix).unwrap_err();
        assert!(matches!(err, DetectorError::Normalization(_)));
        assert_eq!(err.class(), ErrorClass::Internal);

        let err = detector.score(&matrix).unwrap_err();
        assert!(matches!(err, DetectorError::Inference(_)));
    }

    #[test]
    fn test_stats_count_scored_rows() {
        let detector = gate_detector();
        detector.predict_one(features(0.0)).unwrap();
        let data = [csv_line(1.0), csv_line(2.0)].join("\n");
        detector.predict_csv(data.as_bytes()).unwrap();

        let stats = detector.stats();
        assert_eq!(stats.inference_count, 2);
        assert_eq!(stats.rows_scored, 3);
    }

    #[test]
    fn test_model_info_when_ready() {
        let info = gate_detector().model_info().unwrap();
        assert_eq!(info.architecture.input_size, FEATURE_COUNT);
        assert_eq!(info.architecture.hidden_size_1, 128);
        assert_eq!(info.attack_threshold, 0.5);
        assert_eq!(info.scaler_kind, ScalerKind::Standard);
    }
}
