//! Model Bundle - persisted artifact loaded once at startup
//!
//! The bundle carries everything the inference pipeline needs:
//! the classifier, the feature contract (names, dtypes, allowed values)
//! and the preprocessing fitted at training time (label encoders, scalers).
//!
//! `expected_features` is the single source of truth for presence checks
//! and column order. Every other map is keyed by a subset of it.

pub mod encoder;
pub mod loader;
pub mod scaler;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Classifier;

pub use encoder::LabelEncoder;
pub use loader::{load, BundleError};
pub use scaler::Scaler;

// ============================================================================
// FIELD TYPES
// ============================================================================

/// Declared type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Float,
    Integer,
    Boolean,
    /// Kept as text until a label encoder turns it into a code
    Categorical,
}

impl FieldType {
    /// Parse a dtype string as written by the training notebook (pandas names)
    pub fn parse(dtype: &str) -> Option<Self> {
        match dtype {
            "float64" | "float32" | "float" => Some(Self::Float),
            "int64" | "int32" | "Int64" | "int" => Some(Self::Integer),
            "bool" | "boolean" => Some(Self::Boolean),
            "object" | "category" | "string" | "str" => Some(Self::Categorical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Float => "float64",
            Self::Integer => "int64",
            Self::Boolean => "bool",
            Self::Categorical => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Integer)
    }
}

impl TryFrom<String> for FieldType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unsupported dtype '{}'", value))
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALUE CONSTRAINTS
// ============================================================================

/// Per-field rule applied by the schema validator
///
/// In the bundle file this is either a JSON list of allowed values
/// or an object of the form `{"dtype": "float64"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueConstraint {
    Allowed(Vec<Value>),
    Dtype {
        dtype: FieldType,
    },
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Immutable model bundle, shared by every request
#[derive(Debug)]
pub struct ModelBundle {
    pub model: Classifier,
    pub expected_features: Vec<String>,
    pub expected_dtypes: HashMap<String, FieldType>,
    pub value_constraints: HashMap<String, ValueConstraint>,
    pub encoders: HashMap<String, LabelEncoder>,
    pub scalers: HashMap<String, Scaler>,
    /// Hex SHA-256 of the bytes the bundle was decoded from
    pub checksum: String,
}

impl ModelBundle {
    pub fn feature_count(&self) -> usize {
        self.expected_features.len()
    }
}
