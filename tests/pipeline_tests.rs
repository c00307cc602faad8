// tests/pipeline_tests.rs
use opencv::{
    core::{CV_8UC3, Mat, Rect, Scalar},
    imgproc::{self, LINE_8},
};
use stallwatch_core::{DetectionMethod, ZoneRegistry};
use stallwatch_cv::{ImageUtils, OccupancyConfig, OccupancyDetector, ReplayDetector};
use std::io::Write;

const DETECTIONS: &str = r#"{"detections": [
    {"bbox": [30, 200, 120, 310], "class_label": "car", "confidence": 0.9},
    {"bbox": [31, 201, 119, 311], "class_label": "car", "confidence": 0.6},
    {"bbox": [35, 205, 118, 305], "class_label": "truck", "confidence": 0.5},
    {"bbox": [250, 330, 340, 440], "class_label": "truck", "confidence": 0.15}
]}"#;

#[test]
fn test_recorded_detections_over_painted_lot() -> anyhow::Result<()> {
    let mut frame = Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(100.0))?;
    // a red car body in stall #7 that the model missed
    imgproc::rectangle(
        &mut frame,
        Rect::new(250, 330, 91, 111),
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        -1,
        LINE_8,
        0,
    )?;

    let dir = tempfile::tempdir()?;
    let detections_path = dir.path().join("detections.json");
    std::fs::File::create(&detections_path)?.write_all(DETECTIONS.as_bytes())?;
    let frame_path = dir.path().join("frame.png");
    ImageUtils::save_image(&frame, &frame_path)?;

    let config = OccupancyConfig::default();
    let detector = ReplayDetector::from_file(&detections_path, &config.detector)?;
    // the duplicate car goes, the overlapping truck is another class and stays
    assert_eq!(detector.detections().len(), 2);

    let registry = ZoneRegistry::default_layout().shared();
    let mut pipeline = OccupancyDetector::new(config, registry, detector)?;
    let result = pipeline.analyze_file(&frame_path)?;

    assert_eq!(result.zones[0].detection_method, DetectionMethod::ObjectDetection);
    assert_eq!(result.zones[6].detection_method, DetectionMethod::ColorAnalysis);
    assert_eq!(result.summary.occupied, 2);

    let report = result.to_report();
    assert_eq!(report.occupancy_rate, 25.0);
    assert_eq!(report.detection_info.color_analysis_zones, 1);
    assert_eq!(report.objects.len(), 2);
    assert_eq!(report.detection_info.objects_detected, 2);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["zones"][6]["detection_method"], "color_analysis");
    assert_eq!(json["statistics"]["occupied"], 2);
    Ok(())
}
