//! Prediction handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::pipeline::{self, PredictionResult};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub timestamp: DateTime<Utc>,
}

/// Run the inference pipeline on one JSON record
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(payload) = payload?;

    let record = match payload {
        Value::Object(map) if !map.is_empty() => map,
        Value::Object(_) | Value::Null => {
            tracing::warn!("Request received without data");
            return Err(AppError::EmptyPayload);
        }
        _ => return Err(AppError::MalformedPayload("Expected a JSON object".to_string())),
    };

    let request_id = Uuid::new_v4();
    // Field names only, values may be patient data
    tracing::info!(%request_id, fields = ?record.keys().collect::<Vec<_>>(), "Request received");

    let result = pipeline::predict(&state.bundle, &state.policy, &record)?;

    tracing::info!(
        %request_id,
        "Prediction completed: {} ({:.2}%)",
        result.risk_level.as_str(),
        result.calibrated_probability
    );

    Ok(Json(PredictionResponse {
        request_id,
        result,
        timestamp: Utc::now(),
    }))
}
