//! Detection strategy contract

use camera_capture::VideoFrame;

use crate::detection::DetectionResult;
use crate::distance::DistanceEstimator;
use crate::AdasError;

/// Produces at most one vehicle detection per frame.
///
/// Implementations own their model resources; the distance estimator is
/// owned by the session and lent per frame so that smoothing state survives
/// a strategy swap.
pub trait DetectionStrategy: Send {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Whether this strategy is a reduced-fidelity fallback
    fn is_degraded(&self) -> bool {
        false
    }

    /// Detect the best vehicle in `frame`.
    ///
    /// `Ok(None)` means no vehicle. Errors are per-frame and never fatal.
    fn detect(
        &mut self,
        frame: &VideoFrame,
        estimator: &mut DistanceEstimator,
    ) -> Result<Option<DetectionResult>, AdasError>;
}
