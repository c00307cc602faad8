//! Pipeline configuration

use crate::Result;
use crate::color::ColorAnalysisConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use stallwatch_core::FusionConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OccupancyConfig {
    pub zones_file: PathBuf,
    pub fusion: FusionConfig,
    pub color: ColorAnalysisConfig,
    pub detector: DetectorConfig,
    pub visualization: VisualizationConfig,
}

/// Post-processing applied to raw model output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub confidence_threshold: f64,
    pub iou_threshold: f64,
    /// Let boxes of different classes suppress each other
    pub agnostic_nms: bool,
}

/// Visualization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    pub draw_objects: bool,
    pub draw_zones: bool,
    pub object_thickness: i32,
    pub zone_thickness: i32,
    pub fill_alpha: f64,
}

impl OccupancyConfig {
    /// Load from a JSON file; absent keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {:?}", path))
    }
}

impl Default for OccupancyConfig {
    fn default() -> Self {
        Self {
            zones_file: "bounding_boxes.json".into(),
            fusion: FusionConfig::default(),
            color: ColorAnalysisConfig::default(),
            detector: DetectorConfig::default(),
            visualization: VisualizationConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.2,
            iou_threshold: 0.4,
            agnostic_nms: false,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            draw_objects: true,
            draw_zones: true,
            object_thickness: 2,
            zone_thickness: 4,
            fill_alpha: 0.3,
        }
    }
}
