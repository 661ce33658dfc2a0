//! Asset Store - Fitted scaler + trained classifier
//!
//! Both artifacts are read once at process start. Loading is all-or-nothing:
//! if either file is missing or invalid, nothing is installed and the caller
//! must refuse to serve. After installation the assets are immutable and
//! read concurrently without locking.

mod loader;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;

use crate::features::{layout_hash, LayoutMismatchError, FEATURE_VERSION};
use crate::model::{ClassifierWeights, FeatureScaler, MlpDetector, ScalerKind, ScalerParams};

pub use loader::{read_classifier_weights, read_scaler_params};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{what} file not found at {}", .path.display())]
    NotFound { what: &'static str, path: PathBuf },

    #[error("failed to read {what} file {}: {source}", .path.display())]
    Io {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what} file {}: {source}", .path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid asset shape: {0}")]
    Shape(String),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),
}

// ============================================================================
// LOADED ASSETS
// ============================================================================

/// Where the assets came from and when
#[derive(Debug, Clone, Serialize)]
pub struct AssetMetadata {
    pub scaler_path: Option<String>,
    pub model_path: Option<String>,
    pub scaler_kind: ScalerKind,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

/// Scaler and classifier, both validated against the fixed architecture
#[derive(Debug)]
pub struct LoadedAssets {
    scaler: FeatureScaler,
    classifier: MlpDetector,
    metadata: AssetMetadata,
}

impl LoadedAssets {
    /// Build from already-parsed parameters
    pub fn from_parts(
        scaler: ScalerParams,
        weights: ClassifierWeights,
    ) -> Result<Self, AssetError> {
        let scaler = FeatureScaler::from_params(scaler)?;
        let classifier = MlpDetector::from_weights(weights)?;

        Ok(Self {
            metadata: AssetMetadata {
                scaler_path: None,
                model_path: None,
                scaler_kind: scaler.kind(),
                feature_version: FEATURE_VERSION,
                layout_hash: layout_hash(),
                loaded_at: Utc::now(),
            },
            scaler,
            classifier,
        })
    }

    /// Read both artifacts from disk, scaler first
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, AssetError> {
        let scaler = read_scaler_params(scaler_path)?;
        log::info!("Scaler loaded successfully from {}", scaler_path.display());

        let weights = read_classifier_weights(model_path)?;
        let mut assets = Self::from_parts(scaler, weights)?;
        log::info!(
            "Classifier loaded successfully from {} (evaluation mode)",
            model_path.display()
        );

        assets.metadata.scaler_path = Some(scaler_path.display().to_string());
        assets.metadata.model_path = Some(model_path.display().to_string());
        Ok(assets)
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &MlpDetector {
        &self.classifier
    }

    pub fn metadata(&self) -> &AssetMetadata {
        &self.metadata
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Init-once holder for the process-wide assets
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: OnceCell<LoadedAssets>,
}

impl AssetStore {
    /// A store that is not ready yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store that is ready with the given assets
    pub fn with_assets(assets: LoadedAssets) -> Self {
        Self {
            assets: OnceCell::with_value(assets),
        }
    }

    /// Load from disk and return a ready store
    pub fn load(scaler_path: &Path, model_path: &Path) -> Result<Self, AssetError> {
        LoadedAssets::load(scaler_path, model_path).map(Self::with_assets)
    }

    pub fn is_ready(&self) -> bool {
        self.assets.get().is_some()
    }

    pub fn get(&self) -> Option<&LoadedAssets> {
        self.assets.get()
    }

    pub fn scaler(&self) -> Option<&FeatureScaler> {
        self.get().map(LoadedAssets::scaler)
    }

    pub fn classifier(&self) -> Option<&MlpDetector> {
        self.get().map(LoadedAssets::classifier)
    }

    pub fn metadata(&self) -> Option<&AssetMetadata> {
        self.get().map(LoadedAssets::metadata)
    }
}
