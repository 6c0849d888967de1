//! Speed Sample Validation

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Highest plausible ground speed (m/s)
    pub max_speed_ms: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            // 300 km/h
            max_speed_ms: 83.34,
        }
    }
}

/// Validator for raw speed samples
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Coerce a raw GPS speed sample (m/s) into a filter input.
    ///
    /// Negative readings are reported by some receivers when stationary and
    /// are treated as 0.
    pub fn sanitize_speed(&self, raw_ms: f64) -> Result<f64, ValidationError> {
        if !raw_ms.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "speed",
                value: raw_ms,
            });
        }
        let speed = if raw_ms < 0.0 {
            debug!("Negative speed sample {} coerced to 0", raw_ms);
            0.0
        } else {
            raw_ms
        };
        self.validate_range("speed", speed, (0.0, self.config.max_speed_ms))?;
        Ok(speed)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_speed() {
        let validator = Validator::default();
        assert_eq!(validator.sanitize_speed(0.0), Ok(0.0));
        assert_eq!(validator.sanitize_speed(27.5), Ok(27.5));
    }

    #[test]
    fn test_negative_speed_coerced() {
        let validator = Validator::default();
        assert_eq!(validator.sanitize_speed(-0.4), Ok(0.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        let validator = Validator::default();
        assert!(matches!(
            validator.sanitize_speed(f64::NAN),
            Err(ValidationError::NonFinite { .. })
        ));
        assert!(validator.sanitize_speed(f64::INFINITY).is_err());
    }

    #[test]
    fn test_implausible_speed_rejected() {
        let validator = Validator::default();
        assert!(matches!(
            validator.sanitize_speed(120.0),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
