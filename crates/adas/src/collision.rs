//! Time-to-collision

use crate::config::CollisionConfig;

/// Combines distance and ego speed into time-to-collision
#[derive(Debug, Clone, Default)]
pub struct CollisionPredictor {
    config: CollisionConfig,
}

impl CollisionPredictor {
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Seconds until contact, rounded to two decimals.
    ///
    /// `None` when the vehicle is effectively stationary, the distance is not
    /// positive, or the result is not a finite non-negative number.
    pub fn ttc(&self, distance_m: f64, speed_kmh: f64) -> Option<f64> {
        if !(speed_kmh > self.config.min_speed_kmh) || !(distance_m > 0.0) {
            return None;
        }

        let speed_ms = speed_kmh / 3.6;
        let ttc = distance_m / speed_ms;
        if !ttc.is_finite() || ttc < 0.0 {
            return None;
        }

        let rounded = (ttc * 100.0).round() / 100.0;
        rounded.is_finite().then_some(rounded)
    }
}
