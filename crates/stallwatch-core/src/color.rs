//! Scoring of per-zone pixel statistics
//!
//! Empty asphalt is flat, dull and uniform. A parked object brings texture,
//! silhouette edges and usually paint saturation. The pixel statistics come
//! from the vision layer; this module only turns them into a signal.

use serde::Serialize;

use crate::fusion::{ColorWeights, FusionConfig};

/// Normalised pixel statistics of one zone, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorMetrics {
    /// Intensity standard deviation / 255
    pub variability_score: f64,
    /// Edge pixels / masked pixels
    pub edge_density: f64,
    /// Mean HSV saturation / 255
    pub saturation_score: f64,
}

impl ColorMetrics {
    pub fn new(variability_score: f64, edge_density: f64, saturation_score: f64) -> Self {
        Self {
            variability_score,
            edge_density,
            saturation_score,
        }
    }
}

/// Fixed-weight linear combination of the three metrics
pub fn combined_score(metrics: &ColorMetrics, weights: &ColorWeights) -> f64 {
    metrics.variability_score * weights.variability
        + metrics.edge_density * weights.edge_density
        + metrics.saturation_score * weights.saturation
}

/// Color evidence that a zone holds something
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorSignal {
    pub zone_index: usize,
    pub variability_score: f64,
    pub edge_density: f64,
    pub saturation_score: f64,
    pub combined_score: f64,
    pub confidence_score: f64,
}

impl ColorSignal {
    /// Score the metrics; `None` unless the combined score clears the
    /// activity threshold. Non-finite metrics never produce a signal.
    pub fn evaluate(
        zone_index: usize,
        metrics: &ColorMetrics,
        config: &FusionConfig,
    ) -> Option<Self> {
        let combined = combined_score(metrics, &config.color_weights);
        if !combined.is_finite() || combined <= config.color_activity_threshold {
            return None;
        }

        let confidence = (combined * config.color_confidence_gain).min(config.color_confidence_cap);

        Some(Self {
            zone_index,
            variability_score: metrics.variability_score,
            edge_density: metrics.edge_density,
            saturation_score: metrics.saturation_score,
            combined_score: combined,
            confidence_score: confidence,
        })
    }
}
