//! Display collaborator payload

use adas::{BoundingBox, DetectionResult};
use serde::{Deserialize, Serialize};

use crate::level::WarningLevel;

const PLACEHOLDER: &str = "--";

/// Everything the overlay needs for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub level: WarningLevel,
    pub distance_m: Option<f64>,
    pub ttc_s: Option<f64>,
    pub confidence: Option<f32>,
    pub boxes: Vec<BoundingBox>,
    pub label: Option<String>,
}

impl DisplayUpdate {
    pub fn from_detection(level: WarningLevel, result: &DetectionResult, ttc_s: Option<f64>) -> Self {
        Self {
            level,
            distance_m: Some(result.distance_m),
            ttc_s,
            confidence: Some(result.confidence),
            boxes: result.bounding_box.into_iter().collect(),
            label: Some(result.label.clone()),
        }
    }

    /// Nothing detected
    pub fn clear() -> Self {
        Self::default()
    }

    /// e.g. "12.3 m"
    pub fn distance_text(&self) -> String {
        self.distance_m
            .map_or_else(|| PLACEHOLDER.to_string(), |d| format!("{:.1} m", d))
    }

    /// e.g. "2.00 s"
    pub fn ttc_text(&self) -> String {
        self.ttc_s
            .map_or_else(|| PLACEHOLDER.to_string(), |t| format!("{:.2} s", t))
    }

    /// e.g. "87%"
    pub fn confidence_text(&self) -> String {
        self.confidence
            .map_or_else(|| PLACEHOLDER.to_string(), |c| format!("{:.0}%", c * 100.0))
    }
}
