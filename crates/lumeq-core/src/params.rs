//! Tunable constants for robust contrast equalization.

use serde::{Deserialize, Serialize};

use crate::error::{EqualizeError, Result};

/// Default power-mean exponent.
pub const DEFAULT_ALPHA: f64 = 0.1;
/// Default saturation threshold.
pub const DEFAULT_TAU: f64 = 10.0;

/// Construction-time parameters. Fields missing from serialized input take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizationParams {
    /// Compression exponent of the power mean. Smaller values weaken outliers. Default: `0.1`.
    pub alpha: f64,
    /// Saturation constant: clamp for the second-pass statistic and bound of the
    /// output range `(-tau, tau)`. Default: `10`.
    pub tau: f64,
}

impl Default for EqualizationParams {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            tau: DEFAULT_TAU,
        }
    }
}

impl EqualizationParams {
    /// Validated constructor.
    pub fn new(alpha: f64, tau: f64) -> Result<Self> {
        let params = Self { alpha, tau };
        params.validate()?;
        Ok(params)
    }

    /// Parse from JSON, e.g. `{"alpha": 0.2}`, and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Both values must be finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("alpha", self.alpha), ("tau", self.tau)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EqualizeError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = EqualizationParams::default();
        assert_eq!(p.alpha, 0.1);
        assert_eq!(p.tau, 10.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_and_nan() {
        for (alpha, tau) in [
            (0.0, 10.0),
            (-0.1, 10.0),
            (0.1, 0.0),
            (f64::NAN, 1.0),
            (0.1, f64::INFINITY),
        ] {
            assert!(
                EqualizationParams::new(alpha, tau).is_err(),
                "alpha={alpha} tau={tau} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_names_offending_field() {
        let err = EqualizationParams::new(0.1, -1.0).unwrap_err();
        assert!(matches!(err, EqualizeError::InvalidParameter { name: "tau", .. }));
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let p = EqualizationParams::from_json(r#"{"alpha": 0.25}"#).unwrap();
        assert_eq!(p.alpha, 0.25);
        assert_eq!(p.tau, DEFAULT_TAU);
    }

    #[test]
    fn test_from_json_rejects_invalid_values_and_syntax() {
        assert!(matches!(
            EqualizationParams::from_json(r#"{"tau": 0}"#),
            Err(EqualizeError::InvalidParameter { name: "tau", .. })
        ));
        assert!(matches!(EqualizationParams::from_json("{alpha"), Err(EqualizeError::Config(_))));
    }
}
