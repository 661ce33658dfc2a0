//! Configuration module

use std::env;
use std::path::PathBuf;

/// Default location of the fitted scaler
pub const DEFAULT_SCALER_PATH: &str = "saved_assets/nbiot_multi_device_scaler.json";

/// Default location of the classifier weights
pub const DEFAULT_MODEL_PATH: &str = "saved_assets/best_nbiot_detector.json";

/// Default cap on request bodies (CSV uploads)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Serialized scaler parameters
    pub scaler_path: PathBuf,

    /// Serialized classifier weights
    pub model_path: PathBuf,

    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            scaler_path: env::var("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scaler_path),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            scaler_path: DEFAULT_SCALER_PATH.into(),
            model_path: DEFAULT_MODEL_PATH.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_json: false,
            environment: "development".to_string(),
        }
    }
}
