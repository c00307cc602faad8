//! One-shot analysis of an image file

use anyhow::{Context, Result};
use stallwatch_core::{FrameReport, ZoneRegistry};
use stallwatch_cv::{
    FixedDetector, ImageUtils, ObjectDetector, OccupancyConfig, OccupancyDetector, OccupancyError,
    ReplayDetector,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// What to analyse and where inputs come from
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub image: PathBuf,
    pub zones: Option<PathBuf>,
    pub detections: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub annotated: Option<PathBuf>,
    /// Embed the annotated frame in the report as a JPEG data URI
    pub embed_image: bool,
}

pub fn run(options: &RunOptions) -> Result<FrameReport> {
    let config = match &options.config {
        Some(path) => OccupancyConfig::load(path)?,
        None => OccupancyConfig::default(),
    };

    let zones_file = options.zones.clone().unwrap_or_else(|| config.zones_file.clone());
    let registry = ZoneRegistry::load(&zones_file).shared();

    match &options.detections {
        Some(path) => {
            let detector = ReplayDetector::from_file(path, &config.detector)?;
            analyze(options, config, registry, detector)
        }
        None => {
            info!("No detections given, running color analysis only");
            analyze(options, config, registry, FixedDetector::empty())
        }
    }
}

fn analyze<D: ObjectDetector>(
    options: &RunOptions,
    config: OccupancyConfig,
    registry: Arc<ZoneRegistry>,
    detector: D,
) -> Result<FrameReport> {
    let mut detector = OccupancyDetector::new(config, registry, detector)?;

    let image = ImageUtils::load_color(&options.image)
        .map_err(|e| OccupancyError::InvalidImage(format!("{:#}", e)))?;
    let result = detector.analyze_frame(&image)?;

    if let Some(path) = &options.annotated {
        let annotated = detector.annotate(&image, &result)?;
        ImageUtils::save_image(&annotated, path)
            .with_context(|| format!("Failed to write annotated frame: {:?}", path))?;
        info!("Annotated frame written to {:?}", path);
    }

    if options.embed_image {
        detector.annotated_report(&image, &result)
    } else {
        Ok(result.to_report())
    }
}
