//! Inference Pipeline
//!
//! validate -> transform -> model -> calibrate, over one immutable bundle.
//! Every stage is a pure function of its inputs; nothing is cached between
//! requests, so the bundle can be shared without locking.

pub mod calibrate;
pub mod transform;
pub mod validate;

use thiserror::Error;

use crate::bundle::ModelBundle;
use crate::model::{InferenceError, Predictor};

pub use calibrate::{calibrate, PredictionResult, RiskLevel, RiskPolicy};
pub use transform::{transform, Cell, FeatureVector, TransformError, ValidatedRecord};
pub use validate::{validate, ValidationError};

/// Raw request body: feature name -> value as received
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Run the full pipeline for one record
pub fn predict(
    bundle: &ModelBundle,
    policy: &RiskPolicy,
    record: &Record,
) -> Result<PredictionResult, PipelineError> {
    validate(record, bundle)?;

    let features = transform(record, bundle)?;
    let result = infer(bundle, policy, &features)?;

    tracing::debug!(
        raw_probability = result.raw_probability,
        calibrated = result.calibrated_probability,
        predicted_class = result.predicted_class,
        "Inference complete"
    );

    Ok(result)
}

/// Model call plus calibration on an already transformed row
pub fn infer(
    bundle: &ModelBundle,
    policy: &RiskPolicy,
    features: &FeatureVector,
) -> Result<PredictionResult, InferenceError> {
    let row = features.as_slice();
    let predicted_class = bundle.model.predict(row)?;
    let [_, p1] = bundle.model.predict_proba(row)?;

    Ok(policy.assess(p1 * 100.0, predicted_class))
}
