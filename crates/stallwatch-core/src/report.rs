//! Client-facing frame report
//!
//! Field names match the payload the parking-lot web front end consumes.

use serde::{Deserialize, Serialize};

use crate::detection::DetectedObject;
use crate::fusion::ZoneAnalysis;
use crate::stats::OccupancySummary;

pub const DETECTION_MODE: &str = "simplified_any_object";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionInfo {
    pub objects_detected: usize,
    pub color_analysis_zones: usize,
    pub detection_method: String,
}

/// One stall as reported; `id` is 1-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneReport {
    pub id: usize,
    pub occupied: bool,
    pub confidence: f64,
    pub detection_method: String,
    pub overlap_percentage: f64,
    pub color_confidence: f64,
}

impl From<&ZoneAnalysis> for ZoneReport {
    fn from(zone: &ZoneAnalysis) -> Self {
        Self {
            id: zone.zone_index + 1,
            occupied: zone.occupied,
            confidence: zone.confidence,
            detection_method: zone.detection_method.as_str().to_string(),
            overlap_percentage: zone.best_overlap_ratio,
            color_confidence: zone.color_confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReport {
    pub bbox: [f64; 4],
    pub center: [f64; 2],
    pub class_label: String,
    pub confidence: f64,
}

impl From<&DetectedObject> for ObjectReport {
    fn from(object: &DetectedObject) -> Self {
        Self {
            bbox: object.bbox.into(),
            center: object.center.into(),
            class_label: object.class_label.clone(),
            confidence: object.confidence,
        }
    }
}

/// Successful analysis of one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub success: bool,
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    pub occupancy_rate: f64,
    pub statistics: Statistics,
    pub detection_info: DetectionInfo,
    pub zones: Vec<ZoneReport>,
    pub objects: Vec<ObjectReport>,
    /// Annotated frame as a `data:image/jpeg;base64,...` URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_annotated: Option<String>,
}

impl FrameReport {
    pub fn new(
        zones: &[ZoneAnalysis],
        summary: &OccupancySummary,
        objects: &[DetectedObject],
        color_analysis_zones: usize,
    ) -> Self {
        let rate = summary.rounded_rate();
        Self {
            success: true,
            total: summary.total,
            occupied: summary.occupied,
            available: summary.available,
            occupancy_rate: rate,
            statistics: Statistics {
                total: summary.total,
                occupied: summary.occupied,
                available: summary.available,
                occupancy_rate: rate,
            },
            detection_info: DetectionInfo {
                objects_detected: objects.len(),
                color_analysis_zones,
                detection_method: DETECTION_MODE.to_string(),
            },
            zones: zones.iter().map(ZoneReport::from).collect(),
            objects: objects.iter().map(ObjectReport::from).collect(),
            image_annotated: None,
        }
    }

    /// Attach an encoded JPEG as a data URI
    pub fn with_image_annotated(mut self, data_uri: impl Into<String>) -> Self {
        self.image_annotated = Some(data_uri.into());
        self
    }
}

/// Whole-frame failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
}

impl FailureReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::DetectionMethod;
    use crate::geometry::BBox;

    #[test]
    fn test_report_shape() -> anyhow::Result<()> {
        let zones = vec![
            ZoneAnalysis {
                zone_index: 0,
                occupied: true,
                confidence: 0.8,
                detection_method: DetectionMethod::DualDetection,
                best_overlap_ratio: 0.9,
                color_confidence: 0.4,
                occupant: Some(0),
            },
            ZoneAnalysis {
                zone_index: 1,
                occupied: false,
                confidence: 0.0,
                detection_method: DetectionMethod::None,
                best_overlap_ratio: 0.0,
                color_confidence: 0.0,
                occupant: None,
            },
        ];
        let objects = vec![DetectedObject::new(BBox::new(0.0, 0.0, 10.0, 20.0), "car", 0.8)];
        let summary = OccupancySummary::from_zones(&zones);

        let report = FrameReport::new(&zones, &summary, &objects, 1);
        let value = serde_json::to_value(&report)?;

        assert_eq!(value["success"], true);
        assert_eq!(value["occupancy_rate"], 50.0);
        assert_eq!(value["statistics"]["available"], 1);
        assert_eq!(value["detection_info"]["detection_method"], DETECTION_MODE);
        assert_eq!(value["zones"][0]["id"], 1);
        assert_eq!(value["zones"][0]["detection_method"], "dual_detection");
        assert_eq!(value["objects"][0]["center"][1], 10.0);
        assert!(value.get("image_annotated").is_none());
        Ok(())
    }

    #[test]
    fn test_annotated_frame_key() -> anyhow::Result<()> {
        let summary = OccupancySummary::from_zones(&[]);
        let report = FrameReport::new(&[], &summary, &[], 0)
            .with_image_annotated("data:image/jpeg;base64,/9j/4AAQ");

        let value = serde_json::to_value(&report)?;
        assert_eq!(value["image_annotated"], "data:image/jpeg;base64,/9j/4AAQ");
        assert!(value.get("annotated_image").is_none());
        Ok(())
    }

    #[test]
    fn test_failure_report() -> anyhow::Result<()> {
        let value = serde_json::to_value(FailureReport::new("could not decode image"))?;
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "could not decode image");
        Ok(())
    }
}
