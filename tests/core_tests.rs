// tests/core_tests.rs
use stallwatch_core::{
    BBox, ColorMetrics, ColorSignal, DetectedObject, DetectionMethod, FrameReport, FusionConfig,
    FusionEngine, OccupancySummary, Point, SignificanceFilter, ZoneRegistry,
};
use std::io::Write;

fn analyse(
    registry: &ZoneRegistry,
    objects: Vec<DetectedObject>,
    signals: &[ColorSignal],
) -> (stallwatch_core::FusionOutcome, OccupancySummary) {
    let config = FusionConfig::default();
    let (accepted, _) = SignificanceFilter::new(&config).partition(objects);
    let outcome = FusionEngine::new(config).analyze(registry, &accepted, signals);
    let summary = OccupancySummary::from_zones(&outcome.zones);
    (outcome, summary)
}

#[test]
fn test_quiet_lot_reports_every_stall_free() {
    let registry = ZoneRegistry::default_layout();
    let (outcome, summary) = analyse(&registry, Vec::new(), &[]);

    assert_eq!(outcome.zones.len(), 8);
    assert!(outcome.occupied.is_empty());
    assert_eq!(summary.available, 8);

    let report = FrameReport::new(&outcome.zones, &summary, &[], 0);
    assert!(report.success);
    assert_eq!(report.occupancy_rate, 0.0);
    assert_eq!(report.zones.iter().map(|z| z.id).collect::<Vec<_>>(), (1..=8).collect::<Vec<_>>());
    assert!(report.zones.iter().all(|z| z.detection_method == "none"));
}

#[test]
fn test_single_stall_fully_covered() {
    let registry = ZoneRegistry::from_polygons(vec![vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    ]]);
    let objects = vec![DetectedObject::new(BBox::new(10.0, 10.0, 90.0, 90.0), "car", 0.8)];
    let (outcome, summary) = analyse(&registry, objects, &[]);

    let zone = &outcome.zones[0];
    assert!(zone.occupied);
    assert_eq!(zone.detection_method, DetectionMethod::ObjectDetection);
    assert_eq!(zone.confidence, 0.8);
    assert_eq!(zone.best_overlap_ratio, 1.0);
    assert_eq!(summary.occupancy_rate, 100.0);
}

#[test]
fn test_weak_detection_with_color_support_is_dual() {
    let registry = ZoneRegistry::default_layout();
    let config = FusionConfig::default();

    // combined 0.4*0.2 + 0.4*0.1 + 0.2*0.25 = 0.17 -> confidence 0.34
    let metrics = ColorMetrics::new(0.2, 0.1, 0.25);
    let signal = ColorSignal::evaluate(3, &metrics, &config).expect("active zone");

    let objects = vec![DetectedObject::new(BBox::new(360.0, 200.0, 450.0, 310.0), "car", 0.25)];
    let (outcome, _) = analyse(&registry, objects, &[signal]);

    let zone = &outcome.zones[3];
    assert!(zone.occupied);
    assert_eq!(zone.detection_method, DetectionMethod::DualDetection);
    assert_eq!(zone.confidence, 0.25);
    assert!((zone.color_confidence - 0.34).abs() < 1e-9);
}

#[test]
fn test_color_alone_occupies_only_active_zones() {
    let registry = ZoneRegistry::default_layout();
    let config = FusionConfig::default();

    let strong = ColorSignal::evaluate(0, &ColorMetrics::new(0.2, 0.1, 0.25), &config)
        .expect("active zone");
    // combined 0.4*0.1 + 0.4*0.1 + 0.2*0.1 = 0.1, below the activity threshold
    assert!(ColorSignal::evaluate(1, &ColorMetrics::new(0.1, 0.1, 0.1), &config).is_none());

    let (outcome, _) = analyse(&registry, Vec::new(), &[strong]);
    assert_eq!(outcome.zones[0].detection_method, DetectionMethod::ColorAnalysis);
    assert!(outcome.zones[0].confidence > 0.3);
    assert!(!outcome.zones[1].occupied);
    assert_eq!(outcome.zones[1].color_confidence, 0.0);
}

#[test]
fn test_one_object_may_fill_two_stalls() {
    let registry = ZoneRegistry::default_layout();
    // spans stalls #1 and #2 (x 30-120 and 140-230)
    let objects = vec![DetectedObject::new(BBox::new(60.0, 200.0, 200.0, 310.0), "truck", 0.7)];
    let (outcome, _) = analyse(&registry, objects, &[]);

    assert!(outcome.zones[0].occupied);
    assert!(outcome.zones[1].occupied);
    assert_eq!(outcome.zones[0].occupant, Some(0));
    assert_eq!(outcome.zones[1].occupant, Some(0));
}

#[test]
fn test_layout_file_and_fallback() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(
        file,
        r#"[{{"points": [[0, 0], [50, 0], [50, 50], [0, 50]]}},
            {{"points": [[60, 0], [110, 0], [110, 50], [60, 50]]}}]"#
    )?;

    let registry = ZoneRegistry::load(file.path());
    assert_eq!(registry.len(), 2);

    let objects = vec![DetectedObject::new(BBox::new(65.0, 5.0, 105.0, 45.0), "car", 0.9)];
    let (outcome, summary) = analyse(&registry, objects, &[]);
    assert_eq!(outcome.occupied.iter().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(summary.occupancy_rate, 50.0);

    let fallback = ZoneRegistry::load("no/such/bounding_boxes.json");
    assert_eq!(fallback.len(), 8);
    Ok(())
}
