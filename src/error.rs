//! Error handling
//!
//! Validation-stage failures are reported itemized; anything that goes wrong
//! after validation is reported as a generic processing error and the detail
//! only goes to the log.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::pipeline::{PipelineError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    EmptyPayload,
    MalformedPayload(String),

    // Validation errors
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },
    ValidationFailed(BTreeMap<String, String>),

    // Transformation / inference errors
    Processing(String),
}

impl AppError {
    /// Machine-readable category sent as `error`
    pub fn category(&self) -> &'static str {
        match self {
            AppError::EmptyPayload | AppError::MalformedPayload(_) => "invalid_request",
            AppError::MissingColumns { .. } => "missing_columns",
            AppError::ValidationFailed(_) => "validation_failed",
            AppError::Processing(_) => "processing_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let category = self.category();

        let mut body = match self {
            AppError::EmptyPayload => json!({ "message": "No data provided" }),
            AppError::MalformedPayload(msg) => json!({ "message": msg }),
            AppError::MissingColumns { missing, required } => {
                tracing::warn!("Missing columns in request: {:?}", missing);
                json!({
                    "message": "Missing required columns",
                    "missing_columns": missing,
                    "required_columns": required,
                })
            }
            AppError::ValidationFailed(details) => {
                tracing::warn!("Validation errors: {:?}", details);
                json!({
                    "message": "Validation errors in the submitted data",
                    "details": details,
                })
            }
            AppError::Processing(msg) => {
                tracing::error!("Error processing request: {}", msg);
                json!({ "message": "Error processing the request" })
            }
        };

        if let Value::Object(map) = &mut body {
            map.insert("error".into(), json!(category));
            map.insert("status".into(), json!(status.as_u16()));
        }

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(ValidationError::MissingColumns { missing, expected }) => {
                AppError::MissingColumns { missing, required: expected }
            }
            PipelineError::Validation(ValidationError::InvalidValues(details)) => {
                AppError::ValidationFailed(details)
            }
            other => AppError::Processing(other.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}
