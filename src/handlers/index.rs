//! API index - self-description of the service and its feature contract

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::model::Predictor;
use crate::AppState;

pub async fn index(State(state): State<AppState>) -> Json<Value> {
    let bundle = &state.bundle;

    Json(json!({
        "status": "online",
        "api": "SophIA Risk API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "endpoints": {
            "/predict": {
                "method": "POST",
                "description": "Predict maternal mortality risk for one record",
                "required_fields": bundle.expected_features,
            },
            "/health": {
                "method": "GET",
                "description": "Service health status",
            },
        },
        "model": {
            "kind": bundle.model.kind(),
            "features": bundle.model.n_features(),
            "checksum": bundle.checksum,
        },
        "risk_threshold": state.policy.threshold,
    }))
}
