//! Detection model output post-processing
//!
//! The model emits N candidate rows of
//! `(cx, cy, w, h, objectness, class_score_0 .. class_score_k)` in model
//! input pixels. Only the single highest-confidence vehicle survives; there
//! is no suppression across overlapping candidates.

use std::collections::HashSet;

use ndarray::ArrayView2;
use tracing::debug;

use crate::config::DetectionConfig;
use crate::detection::{BoundingBox, DetectionResult};
use crate::distance::DistanceEstimator;
use crate::labels::Labels;

/// Minimum row width: four box values, objectness, one class score
const MIN_ATTRIBUTES: usize = 6;

/// Model input resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelGeometry {
    pub input_width: u32,
    pub input_height: u32,
}

impl ModelGeometry {
    /// X/Y factors mapping model input pixels to frame pixels
    pub fn scale_factors(&self, frame_width: u32, frame_height: u32) -> (f32, f32) {
        let scale = |frame: u32, input: u32| {
            if input > 0 {
                frame as f32 / input as f32
            } else {
                1.0
            }
        };
        (
            scale(frame_width, self.input_width),
            scale(frame_height, self.input_height),
        )
    }
}

impl Default for ModelGeometry {
    fn default() -> Self {
        Self {
            input_width: 640,
            input_height: 640,
        }
    }
}

struct Candidate {
    label: String,
    confidence: f32,
    width_px: f32,
    bbox: BoundingBox,
}

/// Selects the best vehicle candidate from raw model output
#[derive(Debug, Clone)]
pub struct PostProcessor {
    labels: Labels,
    vehicle_labels: HashSet<String>,
    confidence_threshold: f32,
    geometry: ModelGeometry,
}

impl PostProcessor {
    pub fn new(config: &DetectionConfig, labels: Labels, geometry: ModelGeometry) -> Self {
        Self {
            labels,
            vehicle_labels: config.vehicle_labels.iter().cloned().collect(),
            confidence_threshold: config.confidence_threshold,
            geometry,
        }
    }

    pub fn geometry(&self) -> ModelGeometry {
        self.geometry
    }

    /// Pick the best vehicle in one frame's output.
    ///
    /// The distance estimator is advanced at most once, for the final winner.
    pub fn select_best(
        &self,
        output: ArrayView2<'_, f32>,
        frame_width: u32,
        frame_height: u32,
        estimator: &mut DistanceEstimator,
    ) -> Option<DetectionResult> {
        let (scale_x, scale_y) = self.geometry.scale_factors(frame_width, frame_height);
        let image_width = (frame_width as f32).max(1.0);
        let image_height = (frame_height as f32).max(1.0);

        let mut best: Option<Candidate> = None;
        let mut best_confidence = 0.0f32;

        for row in output.rows() {
            if row.len() < MIN_ATTRIBUTES {
                continue;
            }
            if row.iter().any(|v| !v.is_finite()) {
                debug!("Inference skipped (non-finite values)");
                continue;
            }

            let objectness = row[4].clamp(0.0, 1.0);
            let (class_index, class_confidence) = row
                .iter()
                .skip(5)
                .copied()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |best, (i, score)| {
                    if score > best.1 {
                        (i, score)
                    } else {
                        best
                    }
                });

            let label = self.labels.resolve(class_index);
            let confidence = (objectness * class_confidence).clamp(0.0, 1.0);

            if !self.vehicle_labels.contains(label.as_ref()) {
                debug!(
                    "Inference skipped (non-vehicle): label={} objectness={:.2} classConfidence={:.2} confidence={:.2}",
                    label, objectness, class_confidence, confidence
                );
                continue;
            }

            if confidence < self.confidence_threshold || confidence <= best_confidence {
                let reason = if confidence <= best_confidence {
                    "lower than best"
                } else {
                    "below threshold"
                };
                debug!("Inference skipped ({}): label={} confidence={:.2}", reason, label, confidence);
                continue;
            }

            let bbox_width = row[2] * scale_x;
            let bbox_height = row[3] * scale_y;
            let center_x = row[0] * scale_x;
            let center_y = row[1] * scale_y;
            let half_width = bbox_width / 2.0;
            let half_height = bbox_height / 2.0;

            let left = (center_x - half_width).clamp(0.0, image_width);
            let top = (center_y - half_height).clamp(0.0, image_height);
            let right = (center_x + half_width).clamp(0.0, image_width);
            let bottom = (center_y + half_height).clamp(0.0, image_height);

            if right <= left || bottom <= top {
                debug!(
                    "Inference skipped (invalid bbox): label={} width={:.2} height={:.2}",
                    label, bbox_width, bbox_height
                );
                continue;
            }

            let Some(bbox) = BoundingBox::new(
                left / image_width,
                top / image_height,
                right / image_width,
                bottom / image_height,
            ) else {
                continue;
            };

            best_confidence = confidence;
            best = Some(Candidate {
                label: label.into_owned(),
                confidence,
                width_px: bbox_width,
                bbox,
            });
        }

        let winner = best?;
        // Saturating float cast; widths beyond u32 are already clamped by the estimator
        let width_px = (winner.width_px.round() as u32).max(1);
        let distance_m = estimator.estimate(width_px, frame_width);

        debug!(
            "Inference accepted: label={} confidence={:.2} distance={:.2}m bbox=[l={:.2}, t={:.2}, r={:.2}, b={:.2}]",
            winner.label,
            winner.confidence,
            distance_m,
            winner.bbox.left,
            winner.bbox.top,
            winner.bbox.right,
            winner.bbox.bottom
        );

        Some(DetectionResult {
            label: winner.label,
            distance_m,
            confidence: winner.confidence,
            bounding_box: Some(winner.bbox),
        })
    }
}
