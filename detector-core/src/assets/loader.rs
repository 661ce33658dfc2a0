use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::de::DeserializeOwned;

use super::AssetError;
use crate::model::{ClassifierWeights, ScalerParams};

/// Read the fitted scaler parameters
pub fn read_scaler_params(path: &Path) -> Result<ScalerParams, AssetError> {
    read_json("scaler", path)
}

/// Read the classifier weights
pub fn read_classifier_weights(path: &Path) -> Result<ClassifierWeights, AssetError> {
    read_json("model", path)
}

fn read_json<T: DeserializeOwned>(what: &'static str, path: &Path) -> Result<T, AssetError> {
    log::debug!("Reading {} from {}", what, path.display());

    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => AssetError::NotFound {
            what,
            path: path.to_path_buf(),
        },
        _ => AssetError::Io {
            what,
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| AssetError::Parse {
        what,
        path: path.to_path_buf(),
        source,
    })
}
