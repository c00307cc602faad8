//! Per-zone color/texture evidence

pub mod analyzer;

pub use analyzer::ColorAnalyzer;

use serde::{Deserialize, Serialize};

/// Canny parameters for edge density
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorAnalysisConfig {
    /// Canny low threshold
    pub canny_low: f64,
    /// Canny high threshold
    pub canny_high: f64,
    /// Sobel aperture (3, 5 or 7)
    pub canny_aperture: i32,
}

impl Default for ColorAnalysisConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            canny_aperture: 3,
        }
    }
}
