//! Collision Pipeline
//!
//! Wires the per-frame decision path for one camera session:
//! frame -> detection strategy -> distance -> TTC (latest speed) -> warning.
//!
//! Frames are handed over through a latest-only slot and processed by a
//! single worker; speed arrives independently on a watch cell.

mod config;
mod session;
mod strategy;
mod worker;

pub use config::PipelineConfig;
pub use session::{FrameOutcome, FrameStatus, PipelineSession};
pub use strategy::{select_strategy, DegradedMode};
pub use worker::FrameWorker;

use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No detection strategy available (model: {model}; heuristic: {heuristic})")]
    NoDetectionStrategy { model: String, heuristic: String },

    #[error("Invalid alert configuration: {0}")]
    Alert(#[from] alerting::AlertError),

    #[error("Invalid distance configuration: {0}")]
    Distance(#[from] adas::DistanceConfigError),

    #[error("Frame worker failed: {0}")]
    Worker(String),
}
