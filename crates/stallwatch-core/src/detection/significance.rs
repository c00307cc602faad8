//! Credibility predicate for raw detections
//!
//! No class filtering happens here: a motorbike, a shopping cart or a
//! pallet occupies a stall as much as a car does.

use tracing::debug;

use super::object::DetectedObject;
use crate::fusion::FusionConfig;
use crate::geometry::BBox;

/// Outcome of the significance check
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    fn accept() -> Self {
        Self {
            accepted: true,
            reason: "significant object detected".to_string(),
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            accepted: false,
            reason,
        }
    }
}

/// Confidence, size and shape thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignificanceFilter {
    min_confidence: f64,
    min_area: f64,
    aspect_range: (f64, f64),
}

impl SignificanceFilter {
    pub fn new(config: &FusionConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            min_area: config.min_area,
            aspect_range: config.aspect_range,
        }
    }

    /// Check in order: confidence, area, aspect ratio
    pub fn evaluate(&self, confidence: f64, bbox_area: f64, bbox: &BBox) -> Verdict {
        // confidence must be a probability; NaN fails every comparison
        if !(0.0..=1.0).contains(&confidence) {
            return Verdict::reject(format!("invalid confidence: {}", confidence));
        }

        if confidence < self.min_confidence {
            return Verdict::reject(format!("confidence too low: {:.3}", confidence));
        }

        if bbox_area.is_nan() || bbox_area < self.min_area {
            return Verdict::reject(format!(
                "area too small: {:.0} < {:.0}",
                bbox_area, self.min_area
            ));
        }

        let aspect_ratio = bbox.aspect_ratio();
        let (low, high) = self.aspect_range;
        if !(low..=high).contains(&aspect_ratio) {
            return Verdict::reject(format!("extreme aspect ratio: {:.2}", aspect_ratio));
        }

        Verdict::accept()
    }

    /// Split objects into accepted and rejected, stamping rejection reasons
    pub fn partition(
        &self,
        objects: Vec<DetectedObject>,
    ) -> (Vec<DetectedObject>, Vec<DetectedObject>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for object in objects {
            let verdict = self.evaluate(object.confidence, object.area(), &object.bbox);
            if verdict.accepted {
                debug!(
                    "Accepted {} (conf: {:.3}, area: {:.0})",
                    object.class_label,
                    object.confidence,
                    object.area()
                );
                accepted.push(object);
            } else {
                debug!(
                    "Rejected {} (conf: {:.3}): {}",
                    object.class_label, object.confidence, verdict.reason
                );
                rejected.push(object.with_rejection(verdict.reason));
            }
        }

        (accepted, rejected)
    }
}

impl Default for SignificanceFilter {
    fn default() -> Self {
        Self::new(&FusionConfig::default())
    }
}
