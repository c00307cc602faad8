//! Frame pipeline: detector output and pixel evidence fused per stall

use super::config::OccupancyConfig;
use crate::Result;
use crate::color::ColorAnalyzer;
use crate::error::OccupancyError;
use crate::traits::ObjectDetector;
use crate::utils::{Annotator, ImageUtils};
use opencv::{core::Mat, prelude::*};
use stallwatch_core::{
    ColorSignal, DetectedObject, FrameReport, FusionEngine, OccupancySummary, SignificanceFilter,
    ZoneAnalysis, ZoneRegistry,
};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

fn invalid_image(e: anyhow::Error) -> OccupancyError {
    OccupancyError::InvalidImage(format!("{:#}", e))
}

/// Everything learned about one frame
#[derive(Debug, Clone)]
pub struct OccupancyResult {
    /// One entry per zone, in registry order
    pub zones: Vec<ZoneAnalysis>,
    pub occupied: BTreeSet<usize>,
    pub summary: OccupancySummary,
    /// Objects that passed the significance filter
    pub objects: Vec<DetectedObject>,
    /// Objects dropped by the filter, with their reasons
    pub rejected: Vec<DetectedObject>,
    pub color_signals: Vec<ColorSignal>,
}

impl OccupancyResult {
    pub fn is_occupied(&self, zone_index: usize) -> bool {
        self.occupied.contains(&zone_index)
    }

    /// Number of zones that produced a color signal
    pub fn color_analysis_zones(&self) -> usize {
        self.color_signals.len()
    }

    pub fn to_report(&self) -> FrameReport {
        FrameReport::new(&self.zones, &self.summary, &self.objects, self.color_analysis_zones())
    }
}

/// Stall occupancy detector for a fixed camera view.
///
/// The zone registry is shared read-only; each concurrent caller needs its
/// own detector instance.
pub struct OccupancyDetector<D: ObjectDetector> {
    config: OccupancyConfig,
    registry: Arc<ZoneRegistry>,
    detector: D,
    analyzer: ColorAnalyzer,
    filter: SignificanceFilter,
    fusion: FusionEngine,
    annotator: Annotator,
}

impl<D: ObjectDetector> OccupancyDetector<D> {
    /// Create new detector
    pub fn new(
        config: OccupancyConfig,
        registry: Arc<ZoneRegistry>,
        mut detector: D,
    ) -> Result<Self, OccupancyError> {
        config.fusion.validate().map_err(OccupancyError::Config)?;
        detector.warm_up().map_err(OccupancyError::Detector)?;

        info!(
            "Occupancy detector ready: {} zones, backend '{}'",
            registry.len(),
            detector.name()
        );

        Ok(Self {
            analyzer: ColorAnalyzer::new(config.color.clone(), config.fusion.clone()),
            filter: SignificanceFilter::new(&config.fusion),
            fusion: FusionEngine::new(config.fusion.clone()),
            annotator: Annotator::new(config.visualization.clone()),
            config,
            registry,
            detector,
        })
    }

    pub fn config(&self) -> &OccupancyConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ZoneRegistry> {
        &self.registry
    }

    /// Analyse an encoded image (JPEG, PNG, ...)
    pub fn analyze_bytes(&mut self, bytes: &[u8]) -> Result<OccupancyResult, OccupancyError> {
        let image = ImageUtils::decode_color(bytes).map_err(invalid_image)?;
        self.analyze_frame(&image)
    }

    /// Analyse an image file
    pub fn analyze_file<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<OccupancyResult, OccupancyError> {
        let image = ImageUtils::load_color(&path).map_err(invalid_image)?;
        self.analyze_frame(&image)
    }

    /// Analyse an in-memory RGB image
    pub fn analyze_rgb_image(
        &mut self,
        rgb_image: &image::RgbImage,
    ) -> Result<OccupancyResult, OccupancyError> {
        let image = ImageUtils::rgb_to_mat(rgb_image).map_err(invalid_image)?;
        self.analyze_frame(&image)
    }

    /// Core analysis of a decoded frame
    pub fn analyze_frame(&mut self, image: &Mat) -> Result<OccupancyResult, OccupancyError> {
        let start_time = Instant::now();

        if image.empty() {
            return Err(OccupancyError::InvalidImage("empty frame".to_string()));
        }
        let frame = ImageUtils::ensure_bgr(image).map_err(invalid_image)?;

        let raw = self.detector.detect(&frame).map_err(OccupancyError::Detector)?;
        debug!("Backend '{}' returned {} detections", self.detector.name(), raw.len());

        let detected: Vec<DetectedObject> = raw.into_iter().map(DetectedObject::from_raw).collect();
        let (objects, rejected) = self.filter.partition(detected);

        let color_signals = match self.analyzer.analyze(&frame, &self.registry) {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Color analysis unavailable for this frame: {:#}", e);
                Vec::new()
            }
        };

        let outcome = self.fusion.analyze(&self.registry, &objects, &color_signals);
        let summary = OccupancySummary::from_zones(&outcome.zones);

        info!(
            "Frame analysed in {}ms: {}/{} occupied ({:.1}%), {} objects, {} color signals",
            start_time.elapsed().as_millis(),
            summary.occupied,
            summary.total,
            summary.occupancy_rate,
            objects.len(),
            color_signals.len()
        );

        Ok(OccupancyResult {
            zones: outcome.zones,
            occupied: outcome.occupied,
            summary,
            objects,
            rejected,
            color_signals,
        })
    }

    /// Render a result onto a copy of the frame
    pub fn annotate(&self, image: &Mat, result: &OccupancyResult) -> Result<Mat> {
        let frame = ImageUtils::ensure_bgr(image)?;
        self.annotator.draw(&frame, &self.registry, result)
    }

    /// Client report with the rendered frame embedded as a JPEG data URI
    pub fn annotated_report(&self, image: &Mat, result: &OccupancyResult) -> Result<FrameReport> {
        let annotated = self.annotate(image, result)?;
        let data_uri = ImageUtils::encode_jpeg_data_uri(&annotated)?;
        Ok(result.to_report().with_image_annotated(data_uri))
    }
}
