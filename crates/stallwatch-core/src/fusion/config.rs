//! Occupancy decision thresholds

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Weights of the three color metrics in the combined score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorWeights {
    pub variability: f64,
    pub edge_density: f64,
    pub saturation: f64,
}

impl Default for ColorWeights {
    fn default() -> Self {
        Self {
            variability: 0.4,
            edge_density: 0.4,
            saturation: 0.2,
        }
    }
}

/// Every threshold the filter, color scorer and fusion engine consult.
///
/// Built once by the host and shared read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Detections below this confidence are discarded
    pub min_confidence: f64,
    /// Minimum bbox area in square pixels
    pub min_area: f64,
    /// Accepted width/height range, inclusive
    pub aspect_range: (f64, f64),
    /// An object whose center is outside a zone still counts above this overlap
    pub overlap_threshold: f64,
    pub color_weights: ColorWeights,
    /// Combined score a zone must exceed to emit a color signal
    pub color_activity_threshold: f64,
    /// Multiplier from combined score to color confidence
    pub color_confidence_gain: f64,
    /// Color evidence alone is never fully certain
    pub color_confidence_cap: f64,
    /// Color confidence needed to mark an undetected zone occupied
    pub color_confirm_threshold_primary: f64,
    /// Color confidence needed to upgrade a detection to dual
    pub color_confirm_threshold_dual: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.15,
            min_area: 500.0,
            aspect_range: (0.2, 8.0),
            overlap_threshold: 0.15,
            color_weights: ColorWeights::default(),
            color_activity_threshold: 0.15,
            color_confidence_gain: 2.0,
            color_confidence_cap: 0.9,
            color_confirm_threshold_primary: 0.3,
            color_confirm_threshold_dual: 0.2,
        }
    }
}

impl FusionConfig {
    /// Reject values that would make the decision policy meaningless
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("min_confidence", self.min_confidence),
            ("overlap_threshold", self.overlap_threshold),
            ("color_activity_threshold", self.color_activity_threshold),
            ("color_confidence_cap", self.color_confidence_cap),
            ("color_confirm_threshold_primary", self.color_confirm_threshold_primary),
            ("color_confirm_threshold_dual", self.color_confirm_threshold_dual),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", name, value);
            }
        }

        if !(self.min_area >= 0.0) {
            bail!("min_area must be non-negative, got {}", self.min_area);
        }

        let (low, high) = self.aspect_range;
        if !(low >= 0.0 && low <= high) {
            bail!("aspect_range must satisfy 0 <= low <= high, got ({}, {})", low, high);
        }

        let ColorWeights { variability, edge_density, saturation } = self.color_weights;
        if [variability, edge_density, saturation].iter().any(|w| !(*w >= 0.0)) {
            bail!("color_weights must be non-negative, got {:?}", self.color_weights);
        }

        if !(self.color_confidence_gain >= 0.0) {
            bail!("color_confidence_gain must be non-negative, got {}", self.color_confidence_gain);
        }

        Ok(())
    }
}
