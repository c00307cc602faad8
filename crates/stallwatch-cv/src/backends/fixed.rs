use crate::Result;
use crate::traits::ObjectDetector;
use opencv::core::Mat;
use stallwatch_core::RawDetection;

/// Returns the same detections for every frame.
///
/// With no detections this turns the pipeline into a color-only analyzer.
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    detections: Vec<RawDetection>,
}

impl FixedDetector {
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl ObjectDetector for FixedDetector {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&mut self, _image: &Mat) -> Result<Vec<RawDetection>> {
        Ok(self.detections.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stallwatch_core::BBox;

    #[test]
    fn test_returns_configured_detections() -> Result<()> {
        let mut detector = FixedDetector::new(vec![RawDetection::new(
            BBox::new(0.0, 0.0, 40.0, 40.0),
            "car",
            0.7,
        )]);

        let image = Mat::default();
        assert_eq!(detector.detect(&image)?.len(), 1);
        assert_eq!(detector.detect(&image)?.len(), 1);
        assert!(FixedDetector::empty().detect(&image)?.is_empty());
        Ok(())
    }
}
