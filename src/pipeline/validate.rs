//! Schema Validator
//!
//! Checks an incoming record against the bundle's feature contract.
//! Presence is checked first; value checks run only when every expected
//! column is there, and they collect every violation instead of stopping
//! at the first one.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use super::Record;
use crate::bundle::{FieldType, ModelBundle, ValueConstraint};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing columns: {missing:?}")]
    MissingColumns {
        missing: Vec<String>,
        expected: Vec<String>,
    },

    #[error("invalid values for {} field(s)", .0.len())]
    InvalidValues(BTreeMap<String, String>),
}

/// Validate `record` against `bundle`
pub fn validate(record: &Record, bundle: &ModelBundle) -> Result<(), ValidationError> {
    let missing: Vec<String> = bundle
        .expected_features
        .iter()
        .filter(|name| !record.contains_key(name.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns {
            missing,
            expected: bundle.expected_features.clone(),
        });
    }

    let mut errors = BTreeMap::new();
    for (field, constraint) in &bundle.value_constraints {
        let Some(value) = record.get(field) else {
            continue;
        };
        if let Err(message) = check_value(field, value, constraint) {
            errors.insert(field.clone(), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValues(errors))
    }
}

fn check_value(field: &str, value: &Value, constraint: &ValueConstraint) -> Result<(), String> {
    match constraint {
        ValueConstraint::Allowed(allowed) => {
            if allowed.iter().any(|candidate| same_value(candidate, value)) {
                Ok(())
            } else {
                Err(format!(
                    "Value '{}' is not valid for '{}'. Allowed values: {}",
                    display_value(value),
                    field,
                    Value::Array(allowed.clone())
                ))
            }
        }
        ValueConstraint::Dtype { dtype } => match dtype {
            FieldType::Float | FieldType::Integer => match to_number(value) {
                Some(_) => Ok(()),
                None => Err(format!("Invalid value for '{}'. Expected a number.", field)),
            },
            FieldType::Boolean => match display_value(value).to_lowercase().as_str() {
                "true" | "false" => Ok(()),
                _ => Err(format!(
                    "Value '{}' is not valid for '{}'. Expected a boolean (true/false).",
                    display_value(value),
                    field
                )),
            },
            FieldType::Categorical => Ok(()),
        },
    }
}

/// Membership test for enumerated values: numbers compare by value
/// (so `1` matches `1.0`), everything else must be identical.
fn same_value(candidate: &Value, value: &Value) -> bool {
    match (candidate, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => candidate == value,
    }
}

/// String form of a raw value: strings unquoted, everything else as JSON
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce-or-null numeric conversion. `None` stands for "not a number".
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}
