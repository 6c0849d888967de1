//! ONNX Inference Engine
//!
//! Model-backed vehicle detection using tract-onnx. The model takes a
//! normalized NHWC float image and emits `[1, N, 5 + C]` candidate rows which
//! are reduced to a single detection by [`adas::PostProcessor`].

mod detector;
mod preprocess;

pub use detector::ModelDetector;
pub use preprocess::to_input_tensor;

use std::path::PathBuf;

use adas::AdasError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid output shape: expected [1, N, >=6], got {actual:?}")]
    InvalidOutputShape { actual: Vec<usize> },
    #[error("Frame rejected: {0}")]
    Frame(#[from] camera_capture::FrameError),
}

impl From<InferenceError> for AdasError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::ModelLoadError(msg) => AdasError::ModelLoad(msg),
            InferenceError::Frame(e) => AdasError::InvalidFrame(e),
            other => AdasError::Inference(other.to_string()),
        }
    }
}

/// Detection model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX model file. No path means no model-backed strategy.
    pub model_path: Option<PathBuf>,

    /// Model input resolution (pixels)
    pub input_width: u32,
    pub input_height: u32,

    /// Run one inference on a blank input after loading
    pub warm_up: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            input_width: 640,
            input_height: 640,
            warm_up: true,
        }
    }
}

impl ModelConfig {
    pub fn geometry(&self) -> adas::ModelGeometry {
        adas::ModelGeometry {
            input_width: self.input_width,
            input_height: self.input_height,
        }
    }
}
