//! Configuration module

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::calibrate::DEFAULT_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: IpAddr,

    /// Server port
    pub port: u16,

    /// Path to the model bundle
    pub bundle_path: PathBuf,

    /// High-risk threshold on the calibrated 0-100 scale
    pub risk_threshold: f64,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            bundle_path: PathBuf::from("models/bundle.json"),
            risk_threshold: DEFAULT_THRESHOLD,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: parse_var("HOST").unwrap_or(defaults.host),

            port: parse_var("PORT").unwrap_or(defaults.port),

            bundle_path: env::var("MODEL_BUNDLE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.bundle_path),

            risk_threshold: parse_var("RISK_THRESHOLD")
                .filter(|t: &f64| t.is_finite())
                .unwrap_or(defaults.risk_threshold),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Log format choice, readable before the rest of the config so the
    /// subscriber is up when config warnings are emitted.
    /// JSON when `LOG_FORMAT=json` or when running in production.
    pub fn json_logs_from_env() -> bool {
        match env::var("LOG_FORMAT") {
            Ok(format) => format.eq_ignore_ascii_case("json"),
            Err(_) => env::var("ENVIRONMENT").is_ok_and(|e| e == "production"),
        }
    }
}

/// Parse an environment variable, warning (and returning `None`) when it is set but invalid
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}
