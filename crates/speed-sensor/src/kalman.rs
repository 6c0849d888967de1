//! Scalar Kalman Filter for Speed Smoothing

use serde::{Deserialize, Serialize};

/// Kalman filter noise parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Process noise added to the error covariance each step (default: 1e-3)
    pub process_noise: f64,
    /// Measurement noise (default: 0.05)
    pub measurement_noise: f64,
    /// Error covariance after the first measurement (default: 1.0)
    pub initial_error_covariance: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-3,
            measurement_noise: 0.05,
            initial_error_covariance: 1.0,
        }
    }
}

/// Filter state, threaded through [`kalman_step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanState {
    pub estimate: f64,
    pub error_covariance: f64,
    pub initialized: bool,
}

impl KalmanState {
    /// Uninitialized state for the given config
    pub fn new(config: &KalmanConfig) -> Self {
        Self {
            estimate: 0.0,
            error_covariance: config.initial_error_covariance,
            initialized: false,
        }
    }
}

/// One predict/update cycle. Returns the next state and the new estimate.
pub fn kalman_step(config: &KalmanConfig, state: KalmanState, measurement: f64) -> (KalmanState, f64) {
    if !state.initialized {
        let next = KalmanState {
            estimate: measurement,
            error_covariance: config.initial_error_covariance,
            initialized: true,
        };
        return (next, measurement);
    }

    let predicted_error = state.error_covariance + config.process_noise;
    let gain = predicted_error / (predicted_error + config.measurement_noise);
    let estimate = state.estimate + gain * (measurement - state.estimate);

    let next = KalmanState {
        estimate,
        error_covariance: (1.0 - gain) * predicted_error,
        initialized: true,
    };
    (next, estimate)
}

/// Speed filter owning its Kalman state
#[derive(Debug, Clone)]
pub struct SpeedFilter {
    config: KalmanConfig,
    state: KalmanState,
}

impl SpeedFilter {
    /// Create a new filter
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            state: KalmanState::new(&config),
            config,
        }
    }

    /// Add a measurement and get the filtered output
    pub fn filter(&mut self, measurement: f64) -> f64 {
        let (state, estimate) = kalman_step(&self.config, self.state, measurement);
        self.state = state;
        estimate
    }

    /// Current estimate, `None` before the first measurement
    pub fn estimate(&self) -> Option<f64> {
        self.state.initialized.then_some(self.state.estimate)
    }

    /// Current state snapshot
    pub fn state(&self) -> KalmanState {
        self.state
    }

    /// Reset the filter
    pub fn reset(&mut self) {
        self.state = KalmanState::new(&self.config);
    }
}

impl Default for SpeedFilter {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_measurement_passes_through() {
        let mut filter = SpeedFilter::default();
        assert_eq!(filter.estimate(), None);
        assert_eq!(filter.filter(12.5), 12.5);
        assert_eq!(filter.estimate(), Some(12.5));
    }

    #[test]
    fn test_second_measurement_gain() {
        let mut filter = SpeedFilter::default();
        filter.filter(10.0);

        // predicted = 1.001, gain = 1.001 / 1.051
        let gain = 1.001 / 1.051;
        let expected = 10.0 + gain * (20.0 - 10.0);
        assert!((filter.filter(20.0) - expected).abs() < 1e-12);

        let cov = filter.state().error_covariance;
        assert!((cov - (1.0 - gain) * 1.001).abs() < 1e-12);
    }

    #[test]
    fn test_converges_on_constant_input() {
        let mut filter = SpeedFilter::default();
        filter.filter(0.0);
        let mut last = 0.0;
        for _ in 0..50 {
            last = filter.filter(15.0);
        }
        assert!((last - 15.0).abs() < 0.01);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = SpeedFilter::default();
        filter.filter(30.0);
        filter.filter(31.0);
        filter.reset();

        assert_eq!(filter.state(), KalmanState::new(&KalmanConfig::default()));
        assert_eq!(filter.filter(5.0), 5.0);
    }

    proptest! {
        #[test]
        fn prop_output_between_estimate_and_measurement(
            first in 0.0f64..100.0,
            second in 0.0f64..100.0,
        ) {
            let mut filter = SpeedFilter::default();
            let prev = filter.filter(first);
            let out = filter.filter(second);

            let lo = prev.min(second);
            let hi = prev.max(second);
            prop_assert!(out >= lo && out <= hi);
            if (second - prev).abs() > 1e-9 {
                prop_assert!(out > lo && out < hi);
            }
        }
    }
}
