use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};

/// One tuple as returned by the external object detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub bbox: BBox,
    pub class_label: String,
    pub confidence: f64,
}

impl RawDetection {
    pub fn new(bbox: BBox, class_label: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            class_label: class_label.into(),
            confidence,
        }
    }
}

/// A detection after corner normalisation, ready for filtering and fusion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedObject {
    pub bbox: BBox,
    pub center: Point,
    pub class_label: String,
    pub confidence: f64,
    /// Set when the significance filter discarded this object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl DetectedObject {
    pub fn new(bbox: BBox, class_label: impl Into<String>, confidence: f64) -> Self {
        Self {
            bbox,
            center: bbox.center(),
            class_label: class_label.into(),
            confidence,
            rejection_reason: None,
        }
    }

    /// Build from detector output, reordering corners if the detector swapped them
    pub fn from_raw(raw: RawDetection) -> Self {
        let RawDetection { bbox, class_label, confidence } = raw;
        Self::new(
            BBox::normalized(bbox.x1, bbox.y1, bbox.x2, bbox.y2),
            class_label,
            confidence,
        )
    }

    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    pub fn with_rejection(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection_reason.is_some()
    }
}
