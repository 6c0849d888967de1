//! Forward Collision Core
//!
//! Per-frame road scene decisions for the brake alert pipeline:
//! - Detection model output post-processing (single best vehicle)
//! - Monocular distance estimation with exponential smoothing
//! - Time-to-collision from distance and ego speed
//! - Pluggable detection strategies (model-backed or heuristic)

pub mod collision;
pub mod config;
pub mod detection;
pub mod distance;
pub mod labels;
pub mod postprocess;
pub mod strategy;

pub use collision::CollisionPredictor;
pub use config::{AdasConfig, CollisionConfig, DetectionConfig, DistanceConfig, DistanceConfigError};
pub use detection::{BoundingBox, DetectionResult};
pub use distance::{DistanceEstimator, DistanceModel, DistanceState};
pub use labels::{Labels, DEFAULT_LABELS};
pub use postprocess::{ModelGeometry, PostProcessor};
pub use strategy::DetectionStrategy;

use camera_capture::FrameError;
use thiserror::Error;

/// ADAS error types
#[derive(Error, Debug)]
pub enum AdasError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
}
