//! Feature Transformer
//!
//! Turns a validated record into the dense row the model was trained on:
//! reindex to `expected_features`, coerce to the declared dtypes, apply
//! label encoders, apply scalers, then flatten to `f64`.

use serde_json::Value;
use thiserror::Error;

use super::validate::{display_value, to_number};
use super::Record;
use crate::bundle::{FieldType, ModelBundle};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("value '{value}' for '{field}' was not seen when the encoder was fitted")]
    UnknownCategory { field: String, value: String },

    #[error("value {value} for '{field}' cannot be represented as an integer")]
    NotIntegral { field: String, value: f64 },

    #[error("'{field}' has no value after coercion")]
    MissingValue { field: String },

    #[error("'{field}' is not numeric and has no encoder")]
    NotNumeric { field: String },

    #[error("'{field}' holds an unsupported value type")]
    Unsupported { field: String },
}

/// One typed value of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
    /// Output of a label encoder
    Code(i64),
}

impl Cell {
    /// Cell for a field with no declared dtype: keep the JSON shape
    fn from_raw(field: &str, value: &Value) -> Result<Self, TransformError> {
        Ok(match value {
            Value::Null => Cell::Missing,
            Value::Bool(b) => Cell::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n.as_f64().map_or(Cell::Missing, Cell::Float),
            },
            Value::String(s) => Cell::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => {
                return Err(TransformError::Unsupported { field: field.to_string() })
            }
        })
    }

    fn coerce(field: &str, value: &Value, dtype: FieldType) -> Result<Self, TransformError> {
        match dtype {
            FieldType::Float => Ok(to_number(value).map_or(Cell::Missing, Cell::Float)),
            FieldType::Integer => match to_number(value) {
                None => Ok(Cell::Missing),
                Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                    Ok(Cell::Integer(n as i64))
                }
                Some(n) => Err(TransformError::NotIntegral { field: field.to_string(), value: n }),
            },
            FieldType::Boolean => {
                Ok(Cell::Boolean(display_value(value).to_lowercase() == "true"))
            }
            FieldType::Categorical => Cell::from_raw(field, value),
        }
    }
}

/// Record reindexed to the bundle's column order, after type coercion
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    columns: Vec<(String, Cell)>,
}

impl ValidatedRecord {
    /// Reindex `record` into `expected_features` order and coerce each column.
    /// Fields the bundle does not know about are dropped.
    pub fn coerce(record: &Record, bundle: &ModelBundle) -> Result<Self, TransformError> {
        let columns = bundle
            .expected_features
            .iter()
            .map(|name| {
                let value = record.get(name).unwrap_or(&Value::Null);
                let cell = match bundle.expected_dtypes.get(name) {
                    Some(&dtype) => Cell::coerce(name, value, dtype)?,
                    None => Cell::from_raw(name, value)?,
                };
                Ok((name.clone(), cell))
            })
            .collect::<Result<Vec<_>, TransformError>>()?;

        Ok(Self { columns })
    }

    /// Replace text cells that have an encoder with their learned code
    pub fn encode(&mut self, bundle: &ModelBundle) -> Result<(), TransformError> {
        for (name, cell) in &mut self.columns {
            let Some(encoder) = bundle.encoders.get(name.as_str()) else {
                continue;
            };
            if let Cell::Text(text) = &*cell {
                let code = encoder.encode(text).ok_or_else(|| TransformError::UnknownCategory {
                    field: name.clone(),
                    value: text.clone(),
                })?;
                *cell = Cell::Code(code);
            }
        }
        Ok(())
    }

    /// Scale numeric cells that have a scaler. Codes and booleans are left alone.
    pub fn scale(&mut self, bundle: &ModelBundle) {
        for (name, cell) in &mut self.columns {
            let Some(scaler) = bundle.scalers.get(name.as_str()) else {
                continue;
            };
            let x = match *cell {
                Cell::Float(x) => x,
                Cell::Integer(i) => i as f64,
                _ => continue,
            };
            *cell = Cell::Float(scaler.transform(x));
        }
    }

    pub fn columns(&self) -> &[(String, Cell)] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Flatten to the model input row
    pub fn into_features(self) -> Result<FeatureVector, TransformError> {
        let values = self
            .columns
            .into_iter()
            .map(|(field, cell)| match cell {
                Cell::Float(x) => Ok(x),
                Cell::Integer(i) | Cell::Code(i) => Ok(i as f64),
                Cell::Boolean(b) => Ok(if b { 1.0 } else { 0.0 }),
                Cell::Missing => Err(TransformError::MissingValue { field }),
                Cell::Text(_) => Err(TransformError::NotNumeric { field }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector(values))
    }
}

/// Ordered model input, one value per expected feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Full transformation of a record that passed validation
pub fn transform(record: &Record, bundle: &ModelBundle) -> Result<FeatureVector, TransformError> {
    let mut row = ValidatedRecord::coerce(record, bundle)?;
    row.encode(bundle)?;
    row.scale(bundle);
    row.into_features()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::bundle::fixtures::{age_diabetes_bundle, maternal_bundle};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn numeric_bundle() -> ModelBundle {
        ModelBundle::from_value(json!({
            "model": {"kind": "logistic_regression", "coefficients": [1.0, 1.0, 1.0], "intercept": 0.0},
            "attributes": ["pas", "pad", "gestacoes"],
            "dtypes": {"pas": "float64", "pad": "float64", "gestacoes": "int64"},
            "value_col": {}
        }))
        .unwrap()
    }

    #[test]
    fn test_numeric_record_passes_through_reordered() {
        let rec = record(json!({"gestacoes": 3, "pad": 80.0, "pas": 120.5, "extra": "x"}));
        let features = transform(&rec, &numeric_bundle()).unwrap();
        assert_eq!(features.as_slice(), &[120.5, 80.0, 3.0]);
    }

    #[test]
    fn test_coercion_follows_dtypes() {
        let rec = record(json!({
            "idade": "31",
            "consultas_prenatal": "4.0",
            "hipertensao": "TRUE",
            "escolaridade": "medio",
            "tipo_parto": "vaginal"
        }));
        let row = ValidatedRecord::coerce(&rec, &maternal_bundle()).unwrap();

        assert_eq!(row.get("idade"), Some(&Cell::Float(31.0)));
        assert_eq!(row.get("consultas_prenatal"), Some(&Cell::Integer(4)));
        assert_eq!(row.get("hipertensao"), Some(&Cell::Boolean(true)));
        assert_eq!(row.get("escolaridade"), Some(&Cell::Text("medio".into())));

        let names: Vec<&str> = row.columns().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["idade", "consultas_prenatal", "hipertensao", "escolaridade", "tipo_parto"]);
    }

    #[test]
    fn test_boolean_coercion_defaults_to_false() {
        let rec = record(json!({
            "idade": 30, "consultas_prenatal": 1, "hipertensao": "yes",
            "escolaridade": "medio", "tipo_parto": "vaginal"
        }));
        let row = ValidatedRecord::coerce(&rec, &maternal_bundle()).unwrap();
        assert_eq!(row.get("hipertensao"), Some(&Cell::Boolean(false)));
    }

    #[test]
    fn test_unparsable_float_becomes_missing() {
        let rec = record(json!({"pas": "alta", "pad": 80, "gestacoes": 1}));
        let row = ValidatedRecord::coerce(&rec, &numeric_bundle()).unwrap();
        assert_eq!(row.get("pas"), Some(&Cell::Missing));
        assert_eq!(
            row.into_features().unwrap_err(),
            TransformError::MissingValue { field: "pas".into() }
        );
    }

    #[test]
    fn test_fractional_integer_is_rejected() {
        let rec = record(json!({"pas": 120, "pad": 80, "gestacoes": 2.5}));
        assert!(matches!(
            transform(&rec, &numeric_bundle()),
            Err(TransformError::NotIntegral { .. })
        ));
    }

    #[test]
    fn test_encode_then_scale() {
        let rec = record(json!({
            "idade": 34, "consultas_prenatal": 6, "hipertensao": true,
            "escolaridade": "superior", "tipo_parto": "cesareo"
        }));
        let features = transform(&rec, &maternal_bundle()).unwrap();
        // idade standardised with mean 28 / scale 6, codes untouched
        assert_eq!(features.as_slice(), &[1.0, 6.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_unknown_category() {
        let bundle = age_diabetes_bundle();
        let mut row = ValidatedRecord::coerce(&record(json!({"age": 40, "diabetes": "type2"})), &bundle)
            .unwrap();
        assert_eq!(
            row.encode(&bundle).unwrap_err(),
            TransformError::UnknownCategory { field: "diabetes".into(), value: "type2".into() }
        );
    }

    #[test]
    fn test_unencoded_text_is_not_numeric() {
        let bundle = ModelBundle::from_value(json!({
            "model": {"kind": "logistic_regression", "coefficients": [1.0], "intercept": 0.0},
            "attributes": ["regiao"],
            "dtypes": {"regiao": "object"},
            "value_col": {}
        }))
        .unwrap();
        let rec = record(json!({"regiao": "norte"}));
        assert_eq!(
            transform(&rec, &bundle).unwrap_err(),
            TransformError::NotNumeric { field: "regiao".into() }
        );
    }

    #[test]
    fn test_transform_is_deterministic() {
        let bundle = maternal_bundle();
        let rec = record(json!({
            "idade": 22.5, "consultas_prenatal": 3, "hipertensao": "false",
            "escolaridade": "fundamental", "tipo_parto": "vaginal"
        }));
        assert_eq!(transform(&rec, &bundle).unwrap(), transform(&rec, &bundle).unwrap());
    }
}
