//! Detector error taxonomy
//!
//! Every failure of the inference pipeline carries an [`ErrorClass`] so the
//! transport layer can pick a status code by inspecting the tag instead of
//! relying on the order of its handlers.

use serde::Serialize;
use thiserror::Error;

/// Which input a shape error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOrigin {
    /// The `features` list of a single-instance request
    Features,
    /// The columns of an uploaded CSV file
    CsvColumns,
}

/// Coarse classification of a [`DetectorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Shape/type/format violation in the request
    ClientInput,
    /// Scaler or classifier not loaded
    NotReady,
    /// Unanticipated fault inside normalization or inference
    Internal,
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model or scaler not loaded. Check server logs.")]
    NotReady,

    #[error("{}", shape_message(.origin, .expected, .actual))]
    InvalidShape {
        origin: InputOrigin,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid feature value at index {index}: expected a finite number")]
    NonFiniteValue { index: usize },

    #[error("Invalid file type. Please upload a CSV file.")]
    UnsupportedMediaType { file_name: String },

    #[error("CSV file is empty.")]
    EmptyInput,

    #[error("Error parsing CSV file. Ensure it's valid CSV with numerical data. ({0})")]
    MalformedInput(String),

    #[error("CSV contains non-numeric data where numbers are expected (row {row}, column {column}).")]
    NonNumericData { row: usize, column: usize },

    #[error("Feature value out of range for the model (row {row}, column {column}).")]
    OutOfRange { row: usize, column: usize },

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Inference error: {0}")]
    Inference(String),
}

fn shape_message(origin: &InputOrigin, expected: &usize, actual: &usize) -> String {
    match origin {
        InputOrigin::Features => {
            format!("Invalid number of features. Expected {}, got {}", expected, actual)
        }
        InputOrigin::CsvColumns => format!(
            "CSV file has incorrect number of columns. Expected {}, got {}.",
            expected, actual
        ),
    }
}

impl DetectorError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DetectorError::NotReady => ErrorClass::NotReady,
            DetectorError::InvalidShape { .. }
            | DetectorError::NonFiniteValue { .. }
            | DetectorError::UnsupportedMediaType { .. }
            | DetectorError::EmptyInput
            | DetectorError::MalformedInput(_)
            | DetectorError::NonNumericData { .. }
            | DetectorError::OutOfRange { .. } => ErrorClass::ClientInput,
            DetectorError::Normalization(_) | DetectorError::Inference(_) => ErrorClass::Internal,
        }
    }
}
