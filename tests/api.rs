//! End-to-end: bundle file on disk -> loader -> router -> prediction

use std::io::Write;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sophia_risk::{bundle, create_router, AppState, Config};
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

fn forest_bundle() -> Value {
    // One stump and one split on pressao_sistolica at 140 (scaled: 1.0)
    json!({
        "model": {
            "kind": "random_forest",
            "n_features": 3,
            "trees": [
                {
                    "n_features": 3,
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -2, -2],
                    "threshold": [1.0, -2.0, -2.0],
                    "value": [[60.0, 40.0], [45.0, 5.0], [15.0, 35.0]]
                },
                {
                    "n_features": 3,
                    "children_left": [-1],
                    "children_right": [-1],
                    "feature": [-2],
                    "threshold": [-2.0],
                    "value": [[3.0, 1.0]]
                }
            ]
        },
        "attributes": ["pressao_sistolica", "gestacoes", "zona"],
        "dtypes": {"pressao_sistolica": "float64", "gestacoes": "int64", "zona": "object"},
        "value_col": {
            "pressao_sistolica": {"dtype": "float64"},
            "gestacoes": {"dtype": "int64"},
            "zona": ["urbana", "rural"]
        },
        "label_encoders": {"zona": {"classes": ["rural", "urbana"]}},
        "scalers": {"pressao_sistolica": {"kind": "standard", "mean": 120.0, "scale": 20.0}}
    })
}

fn write_bundle(doc: &Value) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(doc.to_string().as_bytes()).unwrap();
    file
}

async fn predict(state: AppState, record: Value) -> (StatusCode, Value) {
    let request = Request::post("/predict")
        .header("content-type", "application/json")
        .body(Body::from(record.to_string()))
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_forest_bundle_end_to_end() {
    let file = write_bundle(&forest_bundle());
    let loaded = assert_ok!(bundle::load(file.path()));
    let state = AppState::new(loaded, Config::default());

    // 160 -> z = 2.0 > 1.0: tree says 0.7, stump 0.25 -> raw 47.5% -> calibrated 16.15
    let (status, body) = predict(
        state.clone(),
        json!({"pressao_sistolica": 160, "gestacoes": "3", "zona": "rural"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calibrated_probability"], 16.15);
    assert_eq!(body["risk_flag"], 0);
    assert_eq!(body["risk_level"], "LOW");

    // 110 -> left leaf 0.1, stump 0.25 -> raw 17.5% -> calibrated 5.95
    let (status, body) = predict(
        state,
        json!({"pressao_sistolica": "110", "gestacoes": 1, "zona": "urbana"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calibrated_probability"], 5.95);
}

#[tokio::test]
async fn test_legacy_threshold_is_opt_in() {
    let file = write_bundle(&forest_bundle());
    let config = Config { risk_threshold: 0.5, ..Config::default() };
    let state = AppState::new(assert_ok!(bundle::load(file.path())), config);

    let (_, body) = predict(
        state,
        json!({"pressao_sistolica": 110, "gestacoes": 1, "zona": "urbana"}),
    )
    .await;
    assert_eq!(body["risk_flag"], 1);
    assert_eq!(body["risk_level"], "HIGH");
}

#[test]
fn test_startup_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = assert_err!(bundle::load(dir.path().join("absent.json")));
    assert!(missing.to_string().starts_with("bundle file not found"));

    let mut doc = forest_bundle();
    doc.as_object_mut().unwrap().remove("value_col");
    let file = write_bundle(&doc);
    let err = assert_err!(bundle::load(file.path()));
    assert_eq!(err.to_string(), "expected key 'value_col' not found in bundle");
}
