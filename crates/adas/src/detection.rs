//! Per-frame vehicle detection result

use serde::{Deserialize, Serialize};

/// Detection region normalized to image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Build a box, rejecting empty or out-of-range regions
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Option<Self> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if [left, top, right, bottom].into_iter().all(in_unit) && left < right && top < bottom {
            Some(Self {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Normalized width
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Normalized height
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Best vehicle detection in one frame. Not tracked across frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Class label
    pub label: String,

    /// Smoothed distance estimate (meters)
    pub distance_m: f64,

    /// Detection confidence [0, 1]
    pub confidence: f32,

    /// Normalized region, absent for detectors without geometry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_validation() {
        assert!(BoundingBox::new(0.1, 0.2, 0.5, 0.6).is_some());
        assert!(BoundingBox::new(0.5, 0.2, 0.5, 0.6).is_none());
        assert!(BoundingBox::new(0.1, 0.6, 0.5, 0.2).is_none());
        assert!(BoundingBox::new(-0.1, 0.2, 0.5, 0.6).is_none());
        assert!(BoundingBox::new(0.1, 0.2, 1.5, 0.6).is_none());
    }

    #[test]
    fn test_bounding_box_extent() {
        let bbox = BoundingBox::new(0.25, 0.5, 0.75, 1.0).unwrap();
        assert_eq!(bbox.width(), 0.5);
        assert_eq!(bbox.height(), 0.5);
    }
}
