//! Pipeline configuration

use adas::AdasConfig;
use alerting::AlertConfig;
use fallback::HeuristicConfig;
use inference_engine::ModelConfig;
use serde::{Deserialize, Serialize};
use speed_sensor::SpeedSensorConfig;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detection, distance and TTC
    pub adas: AdasConfig,

    /// Detection model
    pub model: ModelConfig,

    /// Degraded-mode detector
    pub heuristic: HeuristicConfig,

    /// Warning levels and cooldown
    pub alert: AlertConfig,

    /// Speed filtering
    pub speed: SpeedSensorConfig,

    /// Per-frame results buffered for the subscriber before dropping
    pub result_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adas: AdasConfig::default(),
            model: ModelConfig::default(),
            heuristic: HeuristicConfig::default(),
            alert: AlertConfig::default(),
            speed: SpeedSensorConfig::default(),
            result_capacity: 16,
        }
    }
}
