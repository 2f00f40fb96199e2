//! Probability calibration and risk classification
//!
//! The model over-predicts the positive class. Its output is remapped with a
//! fixed affine transform that puts the 50% point at the 17% base rate of
//! the outcome, then compared with the risk threshold.

use serde::{Deserialize, Serialize};

/// Base rate of the outcome, in percent
pub const BASE_RATE_PCT: f64 = 17.0;

/// Default threshold on the calibrated 0-100 scale
pub const DEFAULT_THRESHOLD: f64 = BASE_RATE_PCT;

/// Remap a raw positive-class probability (percent) onto the calibrated scale.
/// Result is clamped to `[0, 100]` and rounded to 2 decimals, half to even.
pub fn calibrate(raw_pct: f64) -> f64 {
    let calibrated = (raw_pct - 50.0) * (BASE_RATE_PCT / 50.0) + BASE_RATE_PCT;
    let rounded = (calibrated * 100.0).round_ties_even() / 100.0;
    rounded.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn from_flag(flag: u8) -> Self {
        if flag == 1 { RiskLevel::High } else { RiskLevel::Low }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Low => "LOW",
        }
    }
}

/// Decision rule applied to the calibrated probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// High risk iff `calibrated >= threshold`
    pub threshold: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self { threshold: DEFAULT_THRESHOLD }
    }
}

impl RiskPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn flag(&self, calibrated: f64) -> u8 {
        u8::from(calibrated >= self.threshold)
    }

    /// Calibrate a raw probability (percent) and classify it
    pub fn assess(&self, raw_pct: f64, predicted_class: u8) -> PredictionResult {
        let calibrated_probability = calibrate(raw_pct);
        let risk_flag = self.flag(calibrated_probability);

        PredictionResult {
            risk_flag,
            calibrated_probability,
            risk_level: RiskLevel::from_flag(risk_flag),
            raw_probability: raw_pct,
            predicted_class,
        }
    }
}

/// Outcome of one inference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub risk_flag: u8,
    /// Percent, `[0, 100]`, 2 decimals
    pub calibrated_probability: f64,
    pub risk_level: RiskLevel,
    /// Model output before calibration, percent
    #[serde(skip)]
    pub raw_probability: f64,
    /// `predict()` output, kept for logs only
    #[serde(skip)]
    pub predicted_class: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(p: f64) -> f64 {
        ((p - 50.0) * 17.0 / 50.0 + 17.0) * 100.0
    }

    #[test]
    fn test_midpoint_maps_to_base_rate() {
        assert_eq!(calibrate(50.0), 17.0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(calibrate(0.0), 0.0);
        assert_eq!(calibrate(100.0), 34.0);
        assert_eq!(calibrate(-10.0), 0.0);
        assert_eq!(calibrate(500.0), 100.0);
    }

    #[test]
    fn test_two_decimals() {
        for p in [0.1, 12.345, 33.333, 49.99, 61.7, 87.125, 99.999] {
            let c = calibrate(p);
            assert!((0.0..=100.0).contains(&c));
            assert!((c * 100.0 - (c * 100.0).round()).abs() < 1e-6, "{} -> {}", p, c);
            assert!((c * 100.0 - reference(p)).abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_threshold_default() {
        let policy = RiskPolicy::default();
        let at_midpoint = policy.assess(50.0, 0);
        assert_eq!(at_midpoint.risk_flag, 1);
        assert_eq!(at_midpoint.risk_level, RiskLevel::High);

        let low = policy.assess(0.0, 0);
        assert_eq!(low.calibrated_probability, 0.0);
        assert_eq!(low.risk_flag, 0);
        assert_eq!(low.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_just_below_threshold() {
        // 49.97% -> 16.99
        let result = RiskPolicy::default().assess(49.97, 0);
        assert_eq!(result.calibrated_probability, 16.99);
        assert_eq!(result.risk_flag, 0);
    }

    #[test]
    fn test_legacy_threshold_flags_almost_everything() {
        let legacy = RiskPolicy::new(0.5);
        assert_eq!(legacy.assess(50.0, 0).risk_flag, 1);
        assert_eq!(legacy.assess(5.0, 0).risk_flag, 1);
        assert_eq!(legacy.assess(0.0, 0).risk_flag, 0);
    }

    #[test]
    fn test_risk_level_serialization() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        assert_eq!(RiskLevel::Low.as_str(), "LOW");
    }
}
