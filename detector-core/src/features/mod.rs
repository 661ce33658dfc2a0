//! Features Module - N-BaIoT feature schema and validated model input

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{
    feature_index, feature_name, layout_hash, validate_layout, LayoutInfo, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use vector::{FeatureMatrix, FeatureVector};
