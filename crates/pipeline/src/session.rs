//! Per-session frame processing
//!
//! A session exclusively owns the distance smoothing state, the warning
//! hysteresis state and the detection strategy. Per-frame failures never
//! escape: malformed frames and inference errors become "no detection".

use std::time::{Duration, Instant};

use adas::{AdasError, CollisionPredictor, DetectionResult, DetectionStrategy, DistanceEstimator};
use alerting::{AlertSink, Decision, DisplaySink, WarningController, WarningLevel};
use camera_capture::VideoFrame;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{PipelineConfig, PipelineError};

/// How a frame was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Detected,
    NoDetection,
    /// Unusable frame buffer, treated as no detection
    Malformed,
    /// Strategy failed on this frame, treated as no detection
    InferenceFailed,
}

impl FrameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameStatus::Detected => "detected",
            FrameStatus::NoDetection => "no_detection",
            FrameStatus::Malformed => "malformed",
            FrameStatus::InferenceFailed => "inference_failed",
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub sequence: u64,
    pub status: FrameStatus,
    pub detection: Option<DetectionResult>,
    /// Speed used for TTC (km/h)
    pub speed_kmh: f64,
    pub ttc_s: Option<f64>,
    pub decision: Decision,
    pub latency: Duration,
}

/// One camera session
pub struct PipelineSession {
    strategy: Box<dyn DetectionStrategy>,
    estimator: DistanceEstimator,
    predictor: CollisionPredictor,
    controller: WarningController,
    speed_kmh: watch::Receiver<f64>,
}

impl PipelineSession {
    pub fn new(
        strategy: Box<dyn DetectionStrategy>,
        config: &PipelineConfig,
        speed_kmh: watch::Receiver<f64>,
        alert: Box<dyn AlertSink>,
        display: Box<dyn DisplaySink>,
    ) -> Result<Self, PipelineError> {
        config.alert.validate()?;
        config.adas.distance.validate()?;

        info!(
            "Starting pipeline session (strategy={}, degraded={})",
            strategy.name(),
            strategy.is_degraded()
        );
        Ok(Self {
            strategy,
            estimator: DistanceEstimator::new(config.adas.distance.clone()),
            predictor: CollisionPredictor::new(config.adas.collision.clone()),
            controller: WarningController::new(config.alert.clone(), alert, display),
            speed_kmh,
        })
    }

    /// Run one frame through detection, TTC and the warning controller
    pub fn process_frame(&mut self, frame: &VideoFrame, now: Instant) -> FrameOutcome {
        let start = Instant::now();
        let speed_kmh = *self.speed_kmh.borrow();

        let detected = match frame.validate() {
            Ok(()) => self.strategy.detect(frame, &mut self.estimator),
            Err(e) => Err(AdasError::InvalidFrame(e)),
        };

        let (status, detection, ttc_s, decision) = match detected {
            Ok(Some(result)) => {
                let ttc_s = self.predictor.ttc(result.distance_m, speed_kmh);
                let decision = self.controller.on_detection(&result, ttc_s, now);
                debug!(
                    "Frame {}: {} at {:.2}m, ttc={:?}, level={}",
                    frame.sequence,
                    result.label,
                    result.distance_m,
                    ttc_s,
                    decision.level.as_str()
                );
                (FrameStatus::Detected, Some(result), ttc_s, decision)
            }
            Ok(None) => (FrameStatus::NoDetection, None, None, self.controller.on_no_detection()),
            Err(AdasError::InvalidFrame(e)) => {
                warn!("Frame {} skipped: {}", frame.sequence, e);
                (FrameStatus::Malformed, None, None, self.controller.on_no_detection())
            }
            Err(e) => {
                warn!("Frame {} inference failed: {}", frame.sequence, e);
                (FrameStatus::InferenceFailed, None, None, self.controller.on_no_detection())
            }
        };

        let latency = start.elapsed();
        record_metrics(status, &decision, latency);

        FrameOutcome {
            sequence: frame.sequence,
            status,
            detection,
            speed_kmh,
            ttc_s,
            decision,
            latency,
        }
    }

    /// Forget smoothing and hysteresis history, e.g. after a camera rebind
    pub fn reset(&mut self) {
        info!("Resetting pipeline session");
        self.estimator.reset();
        self.controller.reset();
    }

    /// Release the alert output and drop the strategy's resources
    pub fn shutdown(mut self) {
        self.controller.release();
        info!("Pipeline session shut down ({})", self.strategy.name());
    }

    pub fn level(&self) -> WarningLevel {
        self.controller.level()
    }

    pub fn is_degraded(&self) -> bool {
        self.strategy.is_degraded()
    }

    pub fn last_distance(&self) -> Option<f64> {
        self.estimator.last_estimate()
    }
}

fn record_metrics(status: FrameStatus, decision: &Decision, latency: Duration) {
    metrics::counter!("frames_processed_total", "status" => status.as_str()).increment(1);
    metrics::histogram!("frame_latency_seconds").record(latency.as_secs_f64());
    metrics::gauge!("warning_level").set(decision.level.as_u8() as f64);
    if let Some(command) = decision.command {
        metrics::counter!("alert_commands_total", "command" => command.as_str()).increment(1);
    }
}
