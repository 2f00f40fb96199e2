//! Bundle loader
//!
//! Reads the JSON artifact produced by the training notebook, checks the
//! required keys, decodes it into typed form and verifies the pieces agree
//! with each other. Any failure here is fatal: the server must not start.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{FieldType, LabelEncoder, ModelBundle, Scaler, ValueConstraint};
use crate::model::{Classifier, Predictor};

/// Keys that must be present at the top level of the bundle, in check order
pub const REQUIRED_KEYS: [&str; 4] = ["model", "attributes", "dtypes", "value_col"];

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("expected key '{0}' not found in bundle")]
    MissingKey(&'static str),

    #[error("failed to decode bundle: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to read bundle: {0}")]
    Io(#[from] std::io::Error),

    #[error("inconsistent bundle: {0}")]
    Inconsistent(String),
}

/// On-disk layout. Key names follow the training notebook.
#[derive(Debug, Deserialize)]
struct BundleFile {
    model: Classifier,
    attributes: Vec<String>,
    dtypes: HashMap<String, FieldType>,
    value_col: HashMap<String, ValueConstraint>,
    #[serde(default)]
    label_encoders: HashMap<String, LabelEncoder>,
    #[serde(default)]
    scalers: HashMap<String, Scaler>,
}

/// Load the bundle from `path`
pub fn load(path: impl AsRef<Path>) -> Result<ModelBundle, BundleError> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BundleError::NotFound(path.to_path_buf()),
        _ => BundleError::Io(e),
    })?;

    let value: Value = serde_json::from_slice(&bytes)?;
    let mut bundle = decode(value)?;
    bundle.checksum = checksum(&bytes);

    tracing::info!(
        path = %path.display(),
        features = bundle.feature_count(),
        model = bundle.model.kind(),
        checksum = %bundle.checksum,
        "Model bundle loaded"
    );

    Ok(bundle)
}

impl ModelBundle {
    /// Build a bundle from an already parsed JSON document
    pub fn from_value(value: Value) -> Result<Self, BundleError> {
        let bytes = serde_json::to_vec(&value)?;
        let mut bundle = decode(value)?;
        bundle.checksum = checksum(&bytes);
        Ok(bundle)
    }
}

fn decode(value: Value) -> Result<ModelBundle, BundleError> {
    let Some(object) = value.as_object() else {
        return Err(BundleError::Inconsistent("top level must be a JSON object".into()));
    };

    for key in REQUIRED_KEYS {
        if !object.contains_key(key) {
            return Err(BundleError::MissingKey(key));
        }
    }

    let file: BundleFile = serde_json::from_value(value)?;
    check_consistency(&file)?;

    Ok(ModelBundle {
        model: file.model,
        expected_features: file.attributes,
        expected_dtypes: file.dtypes,
        value_constraints: file.value_col,
        encoders: file.label_encoders,
        scalers: file.scalers,
        checksum: String::new(),
    })
}

fn check_consistency(file: &BundleFile) -> Result<(), BundleError> {
    if file.attributes.is_empty() {
        return Err(BundleError::Inconsistent("'attributes' is empty".into()));
    }

    let mut seen = HashSet::new();
    for name in &file.attributes {
        if !seen.insert(name.as_str()) {
            return Err(BundleError::Inconsistent(format!("duplicate attribute '{}'", name)));
        }
    }

    let sections = [
        ("dtypes", file.dtypes.keys().collect::<Vec<_>>()),
        ("value_col", file.value_col.keys().collect()),
        ("label_encoders", file.label_encoders.keys().collect()),
        ("scalers", file.scalers.keys().collect()),
    ];
    for (section, keys) in sections {
        if let Some(unknown) = keys.into_iter().find(|k| !seen.contains(k.as_str())) {
            return Err(BundleError::Inconsistent(format!(
                "'{}' references unknown attribute '{}'",
                section, unknown
            )));
        }
    }

    for (field, encoder) in &file.label_encoders {
        if encoder.classes.is_empty() || encoder.has_duplicates() {
            return Err(BundleError::Inconsistent(format!(
                "label encoder for '{}' must have distinct, non-empty classes",
                field
            )));
        }
    }

    if let Some((field, _)) = file.scalers.iter().find(|(_, s)| !s.is_finite()) {
        return Err(BundleError::Inconsistent(format!(
            "scaler for '{}' has non-finite parameters",
            field
        )));
    }

    file.model.validate().map_err(BundleError::Inconsistent)?;

    if file.model.n_features() != file.attributes.len() {
        return Err(BundleError::Inconsistent(format!(
            "model expects {} features but 'attributes' lists {}",
            file.model.n_features(),
            file.attributes.len()
        )));
    }

    Ok(())
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
