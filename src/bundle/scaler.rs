//! Numeric scalers fitted at training time
//!
//! Same arithmetic as the scikit-learn scalers the artifact was exported from.
//! A zero scale is treated as 1 (constant column at fit time).

use serde::{Deserialize, Serialize};

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// z-score: `(x - mean) / scale`
    Standard { mean: f64, scale: f64 },

    /// min-max into `feature_range`
    MinMax {
        data_min: f64,
        data_max: f64,
        #[serde(default = "default_feature_range")]
        feature_range: (f64, f64),
    },

    /// `(x - center) / scale`, center is the median
    Robust { center: f64, scale: f64 },
}

fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 { 1.0 } else { scale }
}

impl Scaler {
    pub fn transform(&self, x: f64) -> f64 {
        match *self {
            Scaler::Standard { mean, scale } => (x - mean) / non_zero(scale),
            Scaler::MinMax { data_min, data_max, feature_range: (lo, hi) } => {
                let std = (x - data_min) / non_zero(data_max - data_min);
                std * (hi - lo) + lo
            }
            Scaler::Robust { center, scale } => (x - center) / non_zero(scale),
        }
    }

    /// All fitted parameters are finite
    pub fn is_finite(&self) -> bool {
        match *self {
            Scaler::Standard { mean, scale } => mean.is_finite() && scale.is_finite(),
            Scaler::MinMax { data_min, data_max, feature_range: (lo, hi) } => {
                [data_min, data_max, lo, hi].iter().all(|v| v.is_finite())
            }
            Scaler::Robust { center, scale } => center.is_finite() && scale.is_finite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaler() {
        let s = Scaler::Standard { mean: 28.0, scale: 6.0 };
        assert_eq!(s.transform(34.0), 1.0);
        assert_eq!(s.transform(28.0), 0.0);
    }

    #[test]
    fn test_min_max_default_range() {
        let s: Scaler = serde_json::from_str(
            r#"{"kind": "min_max", "data_min": 10.0, "data_max": 50.0}"#,
        )
        .unwrap();
        assert_eq!(s.transform(30.0), 0.5);
        assert_eq!(s.transform(10.0), 0.0);
    }

    #[test]
    fn test_min_max_custom_range() {
        let s = Scaler::MinMax { data_min: 0.0, data_max: 10.0, feature_range: (-1.0, 1.0) };
        assert_eq!(s.transform(5.0), 0.0);
        assert_eq!(s.transform(10.0), 1.0);
    }

    #[test]
    fn test_zero_scale_is_identity_shift() {
        let s = Scaler::Standard { mean: 3.0, scale: 0.0 };
        assert_eq!(s.transform(5.0), 2.0);
    }

    #[test]
    fn test_robust_scaler() {
        let s = Scaler::Robust { center: 2.0, scale: 4.0 };
        assert_eq!(s.transform(10.0), 2.0);
    }
}
