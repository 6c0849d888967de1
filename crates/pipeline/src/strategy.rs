//! Detection strategy selection

use adas::DetectionStrategy;
use fallback::HeuristicDetector;
use inference_engine::ModelDetector;
use tracing::{info, warn};

use crate::{PipelineConfig, PipelineError};

/// One-time notice that the pipeline runs on the heuristic detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedMode {
    /// Why the model-backed strategy is unavailable
    pub reason: String,
}

/// Prefer the detection model, fall back to the luminance heuristic.
///
/// Fails only when neither strategy can be built.
pub fn select_strategy(
    config: &PipelineConfig,
) -> Result<(Box<dyn DetectionStrategy>, Option<DegradedMode>), PipelineError> {
    let reason = if config.model.model_path.is_some() {
        match ModelDetector::load(&config.model, &config.adas.detection) {
            Ok(detector) => {
                info!("Using detection strategy: {}", detector.name());
                return Ok((Box::new(detector), None));
            }
            Err(e) => e.to_string(),
        }
    } else {
        "no model configured".to_string()
    };

    match HeuristicDetector::new(config.heuristic.clone()) {
        Ok(detector) => {
            warn!(
                "Detection model unavailable ({}), degraded to {}",
                reason,
                detector.name()
            );
            metrics::gauge!("pipeline_degraded").set(1.0);
            Ok((Box::new(detector), Some(DegradedMode { reason })))
        }
        Err(e) => Err(PipelineError::NoDetectionStrategy {
            model: reason,
            heuristic: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallback::HeuristicConfig;
    use inference_engine::ModelConfig;

    #[test]
    fn test_no_model_degrades_to_heuristic() {
        let (strategy, degraded) = select_strategy(&PipelineConfig::default()).unwrap();
        assert!(strategy.is_degraded());
        assert_eq!(degraded.unwrap().reason, "no model configured");
    }

    #[test]
    fn test_missing_model_file_degrades() {
        let config = PipelineConfig {
            model: ModelConfig {
                model_path: Some("/nonexistent/detector.onnx".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (strategy, degraded) = select_strategy(&config).unwrap();
        assert_eq!(strategy.name(), "luminance-heuristic");
        assert!(degraded.unwrap().reason.contains("Model load failed"));
    }

    #[test]
    fn test_no_strategy_available() {
        let config = PipelineConfig {
            heuristic: HeuristicConfig {
                brightness_threshold: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            select_strategy(&config),
            Err(PipelineError::NoDetectionStrategy { .. })
        ));
    }
}
