//! Heuristic Fallback Detector
//!
//! Provides a reduced-fidelity detection strategy when the detection model
//! cannot be loaded, so the pipeline keeps producing warnings instead of
//! failing outright.

mod heuristic;

pub use heuristic::{HeuristicConfig, HeuristicDetector};

use thiserror::Error;

/// Fallback configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum FallbackError {
    #[error("Brightness threshold {0} outside [0, 1)")]
    InvalidThreshold(f32),
    #[error("Bounding box width fraction {0} outside (0, 1]")]
    InvalidWidthFraction(f32),
}
