//! Dataset Module - Batch uploads
//!
//! Batch requests arrive as a CSV file with one instance per row, no header
//! row and [`FEATURE_COUNT`](crate::features::FEATURE_COUNT) columns.

pub mod reader;


pub use reader::{check_file_name, parse_feature_matrix, CSV_EXTENSION};
