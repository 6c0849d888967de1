//! Luminance-based detection heuristic

use adas::{AdasError, BoundingBox, DetectionResult, DetectionStrategy, DistanceEstimator};
use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::FallbackError;

/// Heuristic detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Mean luminance [0, 1] above which a vehicle is assumed present
    pub brightness_threshold: f32,

    /// Synthesized box width at full confidence, as a fraction of frame width
    pub bbox_width_fraction: f32,

    /// Label reported for heuristic detections
    pub label: String,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 0.35,
            bbox_width_fraction: 0.4,
            label: "car".to_string(),
        }
    }
}

/// Pseudo-detector driven by average frame brightness
#[derive(Debug, Clone)]
pub struct HeuristicDetector {
    config: HeuristicConfig,
}

impl HeuristicDetector {
    pub fn new(config: HeuristicConfig) -> Result<Self, FallbackError> {
        let threshold = config.brightness_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(FallbackError::InvalidThreshold(threshold));
        }
        let fraction = config.bbox_width_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(FallbackError::InvalidWidthFraction(fraction));
        }

        info!(
            "Heuristic detector ready: threshold={:.2} width_fraction={:.2}",
            threshold, fraction
        );
        Ok(Self { config })
    }

    /// Pseudo-confidence from mean luminance, `None` at or below threshold
    pub fn confidence(&self, luminance: f32) -> Option<f32> {
        let threshold = self.config.brightness_threshold;
        if !luminance.is_finite() || luminance <= threshold {
            return None;
        }
        Some(((luminance - threshold) / (1.0 - threshold)).clamp(0.0, 1.0))
    }
}

impl DetectionStrategy for HeuristicDetector {
    fn name(&self) -> &'static str {
        "luminance-heuristic"
    }

    fn is_degraded(&self) -> bool {
        true
    }

    fn detect(
        &mut self,
        frame: &VideoFrame,
        estimator: &mut DistanceEstimator,
    ) -> Result<Option<DetectionResult>, AdasError> {
        let luminance = frame.mean_luminance()?;
        let Some(confidence) = self.confidence(luminance) else {
            debug!("Heuristic skipped (luminance {:.3})", luminance);
            return Ok(None);
        };

        let relative_width = self.config.bbox_width_fraction * confidence;
        let width_px = frame.width as f32 * relative_width;
        let distance_m = if width_px >= 1.0 {
            estimator.estimate(width_px.round() as u32, frame.width)
        } else {
            estimator.estimate_from_confidence(confidence)
        };

        // Centered square-ish region in normalized coordinates
        let half = relative_width / 2.0;
        let bounding_box = BoundingBox::new(0.5 - half, 0.5 - half, 0.5 + half, 0.5 + half);

        debug!(
            "Heuristic accepted: luminance={:.3} confidence={:.2} distance={:.2}m",
            luminance, confidence, distance_m
        );

        Ok(Some(DetectionResult {
            label: self.config.label.clone(),
            distance_m,
            confidence,
            bounding_box,
        }))
    }
}
