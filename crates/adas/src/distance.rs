//! Monocular distance estimation
//!
//! Pinhole-camera relation between the apparent pixel width of a vehicle
//! and its distance, followed by exponential smoothing across frames. The
//! smoothing state is a plain value threaded through [`DistanceModel`];
//! [`DistanceEstimator`] owns one for callers that want a single object per
//! camera session.

use crate::config::DistanceConfig;

/// Smoothing state. Reset whenever the camera session restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistanceState {
    pub last_estimate: Option<f64>,
}

/// Stateless distance computations
#[derive(Debug, Clone)]
pub struct DistanceModel {
    config: DistanceConfig,
}

impl DistanceModel {
    pub fn new(config: DistanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    /// Unsmoothed distance clamped to the configured bounds
    pub fn raw_distance(&self, bbox_width_px: u32, frame_width_px: u32) -> f64 {
        let width = bbox_width_px.max(1) as f64;
        let frame_width = frame_width_px as f64;
        let focal = if self.config.focal_length_px > 0.0 {
            self.config.focal_length_px
        } else {
            frame_width * 1.2
        };

        let raw = (self.config.known_width_m * focal) / width;
        // Rescale for frames captured at a different resolution than calibration
        let normalized = raw * (frame_width / focal);
        if normalized.is_finite() {
            self.clamp(normalized)
        } else {
            self.config.max_distance_m
        }
    }

    /// Clamp into [min_distance_m, max_distance_m]. Never panics, even on an
    /// unvalidated config.
    pub fn clamp(&self, distance_m: f64) -> f64 {
        distance_m
            .max(self.config.min_distance_m)
            .min(self.config.max_distance_m)
    }

    /// Blend a new sample into the smoothed estimate
    pub fn smooth(&self, state: DistanceState, sample_m: f64) -> (DistanceState, f64) {
        let smoothed = match state.last_estimate {
            Some(previous) => {
                self.clamp(previous + self.config.smoothing_factor * (sample_m - previous))
            }
            None => sample_m,
        };
        (
            DistanceState {
                last_estimate: Some(smoothed),
            },
            smoothed,
        )
    }

    /// Geometry-based estimate
    pub fn estimate(
        &self,
        state: DistanceState,
        bbox_width_px: u32,
        frame_width_px: u32,
    ) -> (DistanceState, f64) {
        self.smooth(state, self.raw_distance(bbox_width_px, frame_width_px))
    }

    /// Degraded-mode estimate: lower confidence maps linearly to farther
    /// distance within [fallback_near_m, fallback_far_m]
    pub fn estimate_from_confidence(&self, state: DistanceState, confidence: f32) -> (DistanceState, f64) {
        let c = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0) as f64
        } else {
            0.0
        };
        let near = self.config.fallback_near_m;
        let far = self.config.fallback_far_m;
        let distance = (far - near) * (1.0 - c) + near;
        self.smooth(state, self.clamp(distance))
    }
}

impl Default for DistanceModel {
    fn default() -> Self {
        Self::new(DistanceConfig::default())
    }
}

/// Distance estimator owning its smoothing state
#[derive(Debug, Clone, Default)]
pub struct DistanceEstimator {
    model: DistanceModel,
    state: DistanceState,
}

impl DistanceEstimator {
    pub fn new(config: DistanceConfig) -> Self {
        Self {
            model: DistanceModel::new(config),
            state: DistanceState::default(),
        }
    }

    /// Estimate from the observed pixel width and advance the smoothing state
    pub fn estimate(&mut self, bbox_width_px: u32, frame_width_px: u32) -> f64 {
        let (state, distance) = self.model.estimate(self.state, bbox_width_px, frame_width_px);
        self.state = state;
        distance
    }

    /// Estimate from detection confidence alone
    pub fn estimate_from_confidence(&mut self, confidence: f32) -> f64 {
        let (state, distance) = self.model.estimate_from_confidence(self.state, confidence);
        self.state = state;
        distance
    }

    /// Last smoothed estimate
    pub fn last_estimate(&self) -> Option<f64> {
        self.state.last_estimate
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.state = DistanceState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_smoothing_sequence() {
        let model = DistanceModel::default();
        let mut state = DistanceState::default();
        let mut out = Vec::new();
        for sample in [50.0, 10.0, 10.0, 10.0] {
            let (next, d) = model.smooth(state, model.clamp(sample));
            state = next;
            out.push(d);
        }
        assert_eq!(out, vec![50.0, 40.0, 32.5, 26.875]);
    }

    #[test]
    fn test_pinhole_distance() {
        let model = DistanceModel::default();
        // 1.8 m * 1000 px / 36 px = 50 m
        assert!((model.raw_distance(36, 1000) - 50.0).abs() < 1e-9);
        assert!((model.raw_distance(180, 1000) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_distance_clamped() {
        let model = DistanceModel::default();
        assert_eq!(model.raw_distance(1, 100_000), 200.0);
        assert_eq!(model.raw_distance(4000, 640), 0.5);
    }

    #[test]
    fn test_zero_focal_length_uses_frame_width() {
        let model = DistanceModel::new(DistanceConfig {
            focal_length_px: 0.0,
            ..Default::default()
        });
        // Focal length cancels out of the rescaled relation
        assert!((model.raw_distance(36, 1000) - 50.0).abs() < 1e-9);
        assert_eq!(model.raw_distance(36, 0), 200.0);
    }

    #[test]
    fn test_estimator_reset() {
        let mut estimator = DistanceEstimator::default();
        estimator.estimate(36, 1000);
        assert!(estimator.last_estimate().is_some());

        estimator.reset();
        assert_eq!(estimator.last_estimate(), None);
        assert!((estimator.estimate(180, 1000) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_from_confidence_range() {
        let model = DistanceModel::default();
        let fresh = DistanceState::default();
        assert_eq!(model.estimate_from_confidence(fresh, 1.0).1, 5.0);
        assert_eq!(model.estimate_from_confidence(fresh, 0.0).1, 35.0);
        assert_eq!(model.estimate_from_confidence(fresh, 0.5).1, 20.0);
        assert_eq!(model.estimate_from_confidence(fresh, 7.0).1, 5.0);
    }

    #[test]
    fn test_confidence_estimate_shares_smoothing() {
        let mut estimator = DistanceEstimator::default();
        estimator.estimate(36, 1000);
        // 50 + 0.25 * (35 - 50)
        assert!((estimator.estimate_from_confidence(0.0) - 46.25).abs() < 1e-9);
    }

    #[test]
    fn test_overshooting_smoothing_stays_in_bounds() {
        let mut estimator = DistanceEstimator::new(DistanceConfig {
            smoothing_factor: 1.5,
            ..Default::default()
        });
        // 1.8 * 1000 / 9 = 200 m, then 4000 px clamps to 0.5 m
        assert_eq!(estimator.estimate(9, 1000), 200.0);
        let d = estimator.estimate(4000, 1000);
        assert!((0.5..=200.0).contains(&d));
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let mut estimator = DistanceEstimator::new(DistanceConfig {
            min_distance_m: 50.0,
            max_distance_m: 5.0,
            ..Default::default()
        });
        assert!(estimator.estimate(100, 1000).is_finite());
    }

    proptest! {
        #[test]
        fn prop_estimates_stay_in_bounds(
            widths in proptest::collection::vec(0u32..5000, 1..20),
            frame_width in 0u32..8000,
        ) {
            let mut estimator = DistanceEstimator::default();
            for w in widths {
                let d = estimator.estimate(w, frame_width);
                prop_assert!((0.5..=200.0).contains(&d));
            }
        }
    }
}
