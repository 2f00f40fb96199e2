//! Model Module - binary classifier behind the inference pipeline
//!
//! The persisted predictor is opaque to the rest of the service:
//! callers only see the [`Predictor`] trait. The concrete forms are the
//! ones the training notebook can export as plain parameters.

pub mod linear;
pub mod tree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use linear::LogisticRegression;
pub use tree::{DecisionTree, RandomForest};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("feature {index} is not a finite number")]
    NonFiniteInput { index: usize },

    #[error("model produced a non-finite probability")]
    NonFiniteOutput,
}

// ============================================================================
// PREDICTOR TRAIT
// ============================================================================

/// Binary classifier over a dense feature row
pub trait Predictor {
    /// Number of input columns the model was fitted on
    fn n_features(&self) -> usize;

    /// Class probabilities `[p(0), p(1)]` for one row
    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError>;

    /// Most likely class (ties go to the negative class)
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError> {
        let [p0, p1] = self.predict_proba(features)?;
        Ok(if p1 > p0 { 1 } else { 0 })
    }
}

/// Shape and finiteness check shared by every model
pub(crate) fn check_input(features: &[f64], expected: usize) -> Result<(), InferenceError> {
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch { expected, actual: features.len() });
    }
    if let Some(index) = features.iter().position(|v| !v.is_finite()) {
        return Err(InferenceError::NonFiniteInput { index });
    }
    Ok(())
}

// ============================================================================
// SERIALIZED MODEL
// ============================================================================

/// Classifier as stored in the bundle, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl Classifier {
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::LogisticRegression(_) => "logistic_regression",
            Classifier::DecisionTree(_) => "decision_tree",
            Classifier::RandomForest(_) => "random_forest",
        }
    }

    /// Structural check run once at load time
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Classifier::LogisticRegression(m) => m.validate(),
            Classifier::DecisionTree(m) => m.validate(),
            Classifier::RandomForest(m) => m.validate(),
        }
    }
}

impl Predictor for Classifier {
    fn n_features(&self) -> usize {
        match self {
            Classifier::LogisticRegression(m) => m.n_features(),
            Classifier::DecisionTree(m) => m.n_features(),
            Classifier::RandomForest(m) => m.n_features(),
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<[f64; 2], InferenceError> {
        let proba = match self {
            Classifier::LogisticRegression(m) => m.predict_proba(features)?,
            Classifier::DecisionTree(m) => m.predict_proba(features)?,
            Classifier::RandomForest(m) => m.predict_proba(features)?,
        };

        if proba.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFiniteOutput);
        }
        Ok(proba)
    }
}
