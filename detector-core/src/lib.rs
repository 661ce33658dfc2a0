//! N-BaIoT Botnet Detector - Core inference pipeline
//!
//! Scores IoT network-traffic statistics with a pre-trained feed-forward
//! classifier and reports whether each instance looks like botnet traffic.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │  Readiness   │──▶│   Request    │──▶│   Feature    │──▶│  Inference   │
//! │    Gate      │   │  Validator   │   │  Normalizer  │   │   Engine     │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                                                  │
//!                                       ┌──────────────┐           │
//!                                       │   Response   │◀──────────┘
//!                                       │  Assembler   │
//!                                       └──────────────┘
//! ```
//!
//! - `features/` - Feature layout, vectors and matrices
//! - `model/` - Scaler, MLP forward pass, label decision
//! - `assets/` - Init-once store for the fitted scaler and the classifier
//! - `dataset/` - CSV batch upload parsing

pub mod assets;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod features;
pub mod model;

pub use assets::{AssetError, AssetMetadata, AssetStore, LoadedAssets};
pub use detector::{Detector, EngineStats, EngineStatsSnapshot, ModelInfo};
pub use error::{DetectorError, ErrorClass, InputOrigin};
pub use features::{FeatureMatrix, FeatureVector, FEATURE_COUNT};
pub use model::{PredictionResult, TrafficStatus};
