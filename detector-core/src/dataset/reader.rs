use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{DetectorError, InputOrigin};
use crate::features::{FeatureMatrix, FEATURE_COUNT};

/// Accepted upload extension (case-insensitive)
pub const CSV_EXTENSION: &str = "csv";

/// Reject uploads whose name does not indicate CSV. Runs before the body is read.
pub fn check_file_name(file_name: &str) -> Result<(), DetectorError> {
    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(CSV_EXTENSION));

    if is_csv {
        Ok(())
    } else {
        Err(DetectorError::UnsupportedMediaType {
            file_name: file_name.to_string(),
        })
    }
}

/// Parse a fully buffered CSV upload into a feature matrix
///
/// Checks run in order: empty content, CSV structure, column count, then
/// numeric cells. Rows keep their input order.
pub fn parse_feature_matrix(contents: &[u8]) -> Result<FeatureMatrix, DetectorError> {
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Err(DetectorError::EmptyInput);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .trim(Trim::All)
        .from_reader(contents);

    let records = reader
        .records()
        .collect::<Result<Vec<StringRecord>, _>>()
        .map_err(|e| DetectorError::MalformedInput(e.to_string()))?;

    let Some(first) = records.first() else {
        return Err(DetectorError::EmptyInput);
    };

    if first.len() != FEATURE_COUNT {
        return Err(DetectorError::InvalidShape {
            origin: InputOrigin::CsvColumns,
            expected: FEATURE_COUNT,
            actual: first.len(),
        });
    }

    let mut values = Vec::with_capacity(records.len() * FEATURE_COUNT);
    for (row, record) in records.iter().enumerate() {
        for (column, cell) in record.iter().enumerate() {
            let value = parse_cell(cell).ok_or(DetectorError::NonNumericData {
                row: row + 1,
                column: column + 1,
            })?;
            values.push(value);
        }
    }

    log::debug!("Parsed CSV upload: {} rows x {} columns", records.len(), FEATURE_COUNT);
    FeatureMatrix::from_row_major(records.len(), values)
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}
