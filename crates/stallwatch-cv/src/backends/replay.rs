use crate::Result;
use crate::detection::DetectorConfig;
use crate::traits::ObjectDetector;
use anyhow::Context;
use opencv::core::Mat;
use serde::Deserialize;
use stallwatch_core::RawDetection;
use stallwatch_core::detection::suppress_overlaps;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Detection dumps are either a bare list or wrapped in `{"detections": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionDump {
    List(Vec<RawDetection>),
    Wrapped { detections: Vec<RawDetection> },
}

/// Replays detections recorded from an external model run.
///
/// The model stage's post-processing is applied on load: a confidence
/// floor and per-class non-maximum suppression.
#[derive(Debug, Clone)]
pub struct ReplayDetector {
    detections: Vec<RawDetection>,
}

impl ReplayDetector {
    pub fn new(detections: Vec<RawDetection>, config: &DetectorConfig) -> Self {
        let before = detections.len();
        let detections = suppress_overlaps(
            detections,
            config.confidence_threshold,
            config.iou_threshold,
            config.agnostic_nms,
        );
        debug!("Replay keeps {} of {} detections", detections.len(), before);
        Self { detections }
    }

    /// Load a JSON detection dump
    pub fn from_file<P: AsRef<Path>>(path: P, config: &DetectorConfig) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read detections: {:?}", path))?;

        let detector = Self::from_json_str(&contents, config)
            .with_context(|| format!("Failed to parse detections: {:?}", path))?;

        info!("Loaded {} detections from {:?}", detector.detections.len(), path);
        Ok(detector)
    }

    pub fn from_json_str(json: &str, config: &DetectorConfig) -> Result<Self> {
        let dump: DetectionDump = serde_json::from_str(json).context("Invalid detection JSON")?;
        let detections = match dump {
            DetectionDump::List(detections) => detections,
            DetectionDump::Wrapped { detections } => detections,
        };
        Ok(Self::new(detections, config))
    }

    pub fn detections(&self) -> &[RawDetection] {
        &self.detections
    }
}

impl ObjectDetector for ReplayDetector {
    fn name(&self) -> &str {
        "replay"
    }

    fn detect(&mut self, _image: &Mat) -> Result<Vec<RawDetection>> {
        Ok(self.detections.clone())
    }
}
