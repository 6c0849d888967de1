//! ADAS configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ADAS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdasConfig {
    /// Candidate filtering
    pub detection: DetectionConfig,

    /// Monocular distance calibration and smoothing
    pub distance: DistanceConfig,

    /// Time-to-collision gating
    pub collision: CollisionConfig,
}

/// Detection post-processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Labels treated as vehicles
    pub vehicle_labels: Vec<String>,

    /// Minimum combined confidence (objectness * class score)
    pub confidence_threshold: f32,

    /// Class label file, one name per line
    pub labels_path: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            vehicle_labels: ["car", "bus", "truck", "motorcycle", "bicycle"]
                .into_iter()
                .map(String::from)
                .collect(),
            confidence_threshold: 0.3,
            labels_path: None,
        }
    }
}

/// Distance estimation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceConfig {
    /// Assumed real width of a vehicle (meters)
    pub known_width_m: f64,

    /// Camera focal length (pixels). Non-positive falls back to 1.2x frame width.
    pub focal_length_px: f64,

    /// EMA smoothing factor applied to successive estimates
    pub smoothing_factor: f64,

    /// Clamp bounds (meters)
    pub min_distance_m: f64,
    pub max_distance_m: f64,

    /// Confidence-to-distance mapping used without geometry (meters)
    pub fallback_near_m: f64,
    pub fallback_far_m: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            known_width_m: 1.8,
            focal_length_px: 1200.0,
            smoothing_factor: 0.25,
            min_distance_m: 0.5,
            max_distance_m: 200.0,
            fallback_near_m: 5.0,
            fallback_far_m: 35.0,
        }
    }
}

impl DistanceConfig {
    pub fn validate(&self) -> Result<(), DistanceConfigError> {
        for (name, value) in [
            ("known_width_m", self.known_width_m),
            ("min_distance_m", self.min_distance_m),
            ("max_distance_m", self.max_distance_m),
            ("smoothing_factor", self.smoothing_factor),
            ("fallback_near_m", self.fallback_near_m),
            ("fallback_far_m", self.fallback_far_m),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(DistanceConfigError::NonPositive { name, value });
            }
        }
        if self.smoothing_factor > 1.0 {
            return Err(DistanceConfigError::SmoothingFactor(self.smoothing_factor));
        }
        if self.min_distance_m >= self.max_distance_m {
            return Err(DistanceConfigError::InvertedRange {
                name: "distance",
                low: self.min_distance_m,
                high: self.max_distance_m,
            });
        }
        if self.fallback_near_m > self.fallback_far_m {
            return Err(DistanceConfigError::InvertedRange {
                name: "fallback",
                low: self.fallback_near_m,
                high: self.fallback_far_m,
            });
        }
        Ok(())
    }
}

/// Distance configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum DistanceConfigError {
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("Smoothing factor must be in (0, 1], got {0}")]
    SmoothingFactor(f64),
    #[error("Invalid {name} range [{low}, {high}]")]
    InvertedRange { name: &'static str, low: f64, high: f64 },
}

/// Time-to-collision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Ego speed at or below which no TTC is produced (km/h)
    pub min_speed_kmh: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { min_speed_kmh: 1.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_config_validation() {
        assert!(DistanceConfig::default().validate().is_ok());

        let inverted = DistanceConfig {
            min_distance_m: 50.0,
            max_distance_m: 5.0,
            ..Default::default()
        };
        assert!(matches!(
            inverted.validate(),
            Err(DistanceConfigError::InvertedRange { name: "distance", .. })
        ));

        let overshooting = DistanceConfig {
            smoothing_factor: 1.5,
            ..Default::default()
        };
        assert_eq!(
            overshooting.validate(),
            Err(DistanceConfigError::SmoothingFactor(1.5))
        );

        let frozen = DistanceConfig {
            smoothing_factor: 0.0,
            ..Default::default()
        };
        assert!(frozen.validate().is_err());

        let fallback = DistanceConfig {
            fallback_near_m: 40.0,
            ..Default::default()
        };
        assert!(matches!(
            fallback.validate(),
            Err(DistanceConfigError::InvertedRange { name: "fallback", .. })
        ));

        let nan = DistanceConfig {
            max_distance_m: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
