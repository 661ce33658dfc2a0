//! Decision Threshold - Probability to label
//!
//! label = 1 ("Attack") iff probability > 0.5; a tie at exactly 0.5 is Benign.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Probabilities strictly above this are attacks
pub const ATTACK_THRESHOLD: f32 = 0.5;

/// Human-readable verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficStatus {
    Benign,
    Attack,
}

impl TrafficStatus {
    pub fn label(self) -> u8 {
        match self {
            TrafficStatus::Benign => 0,
            TrafficStatus::Attack => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrafficStatus::Benign => "Benign",
            TrafficStatus::Attack => "Attack",
        }
    }
}

impl std::fmt::Display for TrafficStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one probability
pub fn classify(probability: f32) -> TrafficStatus {
    if probability > ATTACK_THRESHOLD {
        TrafficStatus::Attack
    } else {
        TrafficStatus::Benign
    }
}

/// Prediction output for one instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction_label: u8,
    pub status: TrafficStatus,
    pub probability_attack: f64,
}

impl PredictionResult {
    pub fn from_probability(probability: f32) -> Self {
        let status = classify(probability);
        Self {
            prediction_label: status.label(),
            status,
            probability_attack: f64::from(probability),
        }
    }

    pub fn is_attack(&self) -> bool {
        self.status == TrafficStatus::Attack
    }
}

/// One result per probability, same order
pub fn assemble(probabilities: ArrayView1<'_, f32>) -> Vec<PredictionResult> {
    probabilities
        .iter()
        .copied()
        .map(PredictionResult::from_probability)
        .collect()
}
