//! Model-backed detection strategy

use std::path::Path;
use std::time::Instant;

use adas::{
    AdasError, DetectionConfig, DetectionResult, DetectionStrategy, DistanceEstimator, Labels,
    PostProcessor,
};
use camera_capture::VideoFrame;
use ndarray::ArrayView2;
use tract_onnx::prelude::*;
use tracing::{debug, info, warn};

use crate::preprocess::to_input_tensor;
use crate::{InferenceError, ModelConfig};

/// ONNX vehicle detector
pub struct ModelDetector {
    model: TypedSimplePlan<TypedModel>,
    input_width: u32,
    input_height: u32,
    postprocessor: PostProcessor,
    label_count: usize,
    /// Label/class count agreement is checked on the first output
    labels_checked: bool,
}

impl ModelDetector {
    /// Load and optimize the model named in `config`, optionally warming it up
    pub fn load(config: &ModelConfig, detection: &DetectionConfig) -> Result<Self, InferenceError> {
        let path = config
            .model_path
            .as_deref()
            .ok_or_else(|| InferenceError::ModelLoadError("no model path configured".to_string()))?;
        info!("Loading detection model: {}", path.display());

        let model = Self::load_plan(path, config.input_width, config.input_height)?;
        let labels = Labels::load_or_default(detection.labels_path.as_deref());
        let label_count = labels.len();
        let detector = Self {
            model,
            input_width: config.input_width,
            input_height: config.input_height,
            postprocessor: PostProcessor::new(detection, labels, config.geometry()),
            label_count,
            labels_checked: false,
        };

        if config.warm_up {
            // A failed warm-up only costs first-frame latency
            if let Err(e) = detector.warm_up() {
                warn!("Model warm-up failed: {}", e);
            }
        }

        info!(
            "Detection model ready ({}x{} input)",
            config.input_width, config.input_height
        );
        Ok(detector)
    }

    fn load_plan(
        path: &Path,
        input_width: u32,
        input_height: u32,
    ) -> Result<TypedSimplePlan<TypedModel>, InferenceError> {
        let load_err = |e: TractError| InferenceError::ModelLoadError(e.to_string());

        tract_onnx::onnx()
            .model_for_path(path)
            .map_err(load_err)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, input_height as usize, input_width as usize, 3),
                ),
            )
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?
            .into_runnable()
            .map_err(load_err)
    }

    /// Run one inference on a zero-filled input
    pub fn warm_up(&self) -> Result<(), InferenceError> {
        let start = Instant::now();
        let input = Tensor::zero::<f32>(&[
            1,
            self.input_height as usize,
            self.input_width as usize,
            3,
        ])
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        self.run(input)?;
        debug!("Model warm-up completed in {}ms", start.elapsed().as_millis());
        Ok(())
    }

    fn run(&self, input: Tensor) -> Result<TVec<TValue>, InferenceError> {
        self.model
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
    }
}

impl DetectionStrategy for ModelDetector {
    fn name(&self) -> &'static str {
        "onnx-model"
    }

    fn detect(
        &mut self,
        frame: &VideoFrame,
        estimator: &mut DistanceEstimator,
    ) -> Result<Option<DetectionResult>, AdasError> {
        let start = Instant::now();
        let input = to_input_tensor(frame, self.input_width, self.input_height)?;
        let outputs = self.run(input)?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;
        let rows = candidate_rows(output)?;

        if !self.labels_checked {
            self.labels_checked = true;
            if let Some(classes) = class_count_mismatch(self.label_count, rows.ncols()) {
                warn!(
                    "Label list has {} entries but the model outputs {} classes",
                    self.label_count, classes
                );
            }
        }

        debug!(
            "Inference on frame {} took {}ms ({} candidates)",
            frame.sequence,
            start.elapsed().as_millis(),
            rows.nrows()
        );
        Ok(self
            .postprocessor
            .select_best(rows, frame.width, frame.height, estimator))
    }
}

/// View the model output as candidate rows.
///
/// Accepts `[1, N, 5 + C]` or `[N, 5 + C]`.
fn candidate_rows(output: &Tensor) -> Result<ArrayView2<'_, f32>, InferenceError> {
    let shape = output.shape();
    let (rows, cols) = match shape {
        [1, n, c] | [n, c] => (*n, *c),
        _ => {
            return Err(InferenceError::InvalidOutputShape {
                actual: shape.to_vec(),
            })
        }
    };
    if cols < 6 {
        return Err(InferenceError::InvalidOutputShape {
            actual: shape.to_vec(),
        });
    }

    let data = output
        .as_slice::<f32>()
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
    ArrayView2::from_shape((rows, cols), data)
        .map_err(|e| InferenceError::InferenceFailed(e.to_string()))
}

/// Class count of a `5 + C` row layout when it differs from the label count
fn class_count_mismatch(label_count: usize, cols: usize) -> Option<usize> {
    let classes = cols.saturating_sub(5);
    (classes != label_count).then_some(classes)
}
