//! SophIA Risk API
//!
//! Serves one pre-trained maternal mortality risk classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SOPHIA RISK API                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────────────────────────┐    │
//! │  │  HTTP     │   │  Inference Pipeline                  │    │
//! │  │  (Axum)   │──▶│  validate ▶ transform ▶ model ▶      │    │
//! │  │           │   │  calibrate ▶ threshold               │    │
//! │  └───────────┘   └──────────────────┬───────────────────┘    │
//! │                                     ▼                        │
//! │                     ┌───────────────────────────┐            │
//! │                     │ ModelBundle (Arc, frozen) │            │
//! │                     └───────────────────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod bundle;
pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod pipeline;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use bundle::ModelBundle;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::{PredictionResult, RiskPolicy};

/// Shared application state
///
/// The bundle is never mutated after load, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    pub bundle: Arc<ModelBundle>,
    pub policy: RiskPolicy,
    pub config: Config,
}

impl AppState {
    pub fn new(bundle: ModelBundle, config: Config) -> Self {
        Self {
            bundle: Arc::new(bundle),
            policy: RiskPolicy::new(config.risk_threshold),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        // Legacy path used by the first frontend
        .route("/prever", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
