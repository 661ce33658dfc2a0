//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema the classifier was trained on.**
//!
//! The N-BaIoT statistics are computed over five traffic streams and five
//! decaying time windows:
//!
//! | Stream   | Meaning                          | Statistics |
//! |----------|----------------------------------|------------|
//! | `MI_dir` | source MAC-IP                    | 1-D (3)    |
//! | `H`      | source IP                        | 1-D (3)    |
//! | `HH`     | channel (src IP → dst IP)        | 2-D (7)    |
//! | `HH_jit` | channel jitter                   | 1-D (3)    |
//! | `HpHp`   | socket (src IP:port → dst IP:port) | 2-D (7)  |
//!
//! 5 windows × (3 + 3 + 7 + 3 + 7) = 115 columns, in dataset order.
//!
//! ## Rules
//! 1. Add, remove or reorder a feature → increment FEATURE_VERSION
//! 2. Models declare the layout hash they were trained against

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Total number of features per instance
pub const FEATURE_COUNT: usize = 115;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Decay windows, slowest first
pub const TIME_WINDOWS: &[&str] = &["L5", "L3", "L1", "L0.1", "L0.01"];

const ONE_D_STATS: &[&str] = &["weight", "mean", "variance"];
const TWO_D_STATS: &[&str] = &[
    "weight",
    "mean",
    "std",
    "magnitude",
    "radius",
    "covariance",
    "pcc",
];

const STREAMS: &[(&str, &[&str])] = &[
    ("MI_dir", ONE_D_STATS),
    ("H", ONE_D_STATS),
    ("HH", TWO_D_STATS),
    ("HH_jit", ONE_D_STATS),
    ("HpHp", TWO_D_STATS),
];

/// Feature names in the exact order they appear in a vector / CSV row
pub static FEATURE_LAYOUT: Lazy<Vec<String>> = Lazy::new(|| {
    let mut names = Vec::with_capacity(FEATURE_COUNT);
    for (stream, stats) in STREAMS {
        for window in TIME_WINDOWS {
            for stat in stats.iter() {
                names.push(format!("{}_{}_{}", stream, window, stat));
            }
        }
    }
    debug_assert_eq!(names.len(), FEATURE_COUNT);
    names
});

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version byte and every feature name in order
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);
    for name in FEATURE_LAYOUT.iter() {
        hasher.update(name.as_bytes());
        // Separator so ["ab", "c"] and ["a", "bc"] differ
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Cached layout hash
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

/// Index of a feature by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|n| n == name)
}

/// Name of a feature by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).map(String::as_str)
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} ({expected_hash:#010x}), \
     got v{actual_version} ({actual_hash:#010x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Check a declared layout against the current one
pub fn validate_layout(version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
    if version == FEATURE_VERSION && hash == layout_hash() {
        return Ok(());
    }
    Err(LayoutMismatchError {
        expected_version: FEATURE_VERSION,
        expected_hash: layout_hash(),
        actual_version: version,
        actual_hash: hash,
    })
}

/// Layout summary for diagnostics endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_layout_has_115_unique_names() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
        let unique: HashSet<_> = FEATURE_LAYOUT.iter().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_order_matches_dataset() {
        assert_eq!(feature_name(0), Some("MI_dir_L5_weight"));
        assert_eq!(feature_name(2), Some("MI_dir_L5_variance"));
        assert_eq!(feature_name(15), Some("H_L5_weight"));
        assert_eq!(feature_name(30), Some("HH_L5_weight"));
        assert_eq!(feature_name(36), Some("HH_L5_pcc"));
        assert_eq!(feature_name(65), Some("HH_jit_L5_weight"));
        assert_eq!(feature_name(80), Some("HpHp_L5_weight"));
        assert_eq!(feature_name(114), Some("HpHp_L0.01_pcc"));
        assert_eq!(feature_name(115), None);
    }

    #[test]
    fn test_feature_index_lookup() {
        assert_eq!(feature_index("MI_dir_L5_weight"), Some(0));
        assert_eq!(feature_index("HpHp_L0.01_pcc"), Some(114));
        assert_eq!(feature_index("cpu_percent"), None);
    }

    #[test]
    fn test_layout_hash_is_stable() {
        assert_eq!(layout_hash(), compute_layout_hash());
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
    }

    #[test]
    fn test_layout_mismatch_detected() {
        let err = validate_layout(FEATURE_VERSION, layout_hash() ^ 1).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
    }
}
