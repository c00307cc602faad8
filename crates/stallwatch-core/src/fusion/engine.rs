//! Per-zone occupancy decision

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use super::config::FusionConfig;
use crate::color::ColorSignal;
use crate::detection::DetectedObject;
use crate::geometry::{overlap_ratio, point_in_zone};
use crate::zones::{Zone, ZoneRegistry};

/// Which evidence marked a zone occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    None,
    ObjectDetection,
    ColorAnalysis,
    DualDetection,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::None => "none",
            DetectionMethod::ObjectDetection => "object_detection",
            DetectionMethod::ColorAnalysis => "color_analysis",
            DetectionMethod::DualDetection => "dual_detection",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one zone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAnalysis {
    pub zone_index: usize,
    pub occupied: bool,
    pub confidence: f64,
    pub detection_method: DetectionMethod,
    pub best_overlap_ratio: f64,
    /// Confidence of the zone's color signal, 0 when it had none
    pub color_confidence: f64,
    /// Position of the occupying object in the accepted object list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<usize>,
}

impl ZoneAnalysis {
    fn vacant(zone_index: usize) -> Self {
        Self {
            zone_index,
            occupied: false,
            confidence: 0.0,
            detection_method: DetectionMethod::None,
            best_overlap_ratio: 0.0,
            color_confidence: 0.0,
            occupant: None,
        }
    }
}

/// Zone verdicts of one frame plus the set of occupied indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusionOutcome {
    pub zones: Vec<ZoneAnalysis>,
    pub occupied: BTreeSet<usize>,
}

/// Best detection candidate seen so far for a zone
#[derive(Debug, Clone, Copy)]
struct Candidate {
    object: usize,
    overlap: f64,
    confidence: f64,
}

impl Candidate {
    /// Larger overlap wins; on an exact tie the more confident object wins,
    /// and on a full tie the earlier object is kept.
    fn beats(&self, best: Option<&Candidate>) -> bool {
        match best {
            None => self.overlap > 0.0,
            Some(best) => {
                self.overlap > best.overlap
                    || (self.overlap == best.overlap && self.confidence > best.confidence)
            }
        }
    }
}

/// Combines object detections and color signals into zone verdicts
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Analyse every zone of the registry, in index order
    pub fn analyze(
        &self,
        registry: &ZoneRegistry,
        objects: &[DetectedObject],
        signals: &[ColorSignal],
    ) -> FusionOutcome {
        let mut outcome = FusionOutcome::default();

        for zone in registry {
            let signal = signals.iter().find(|signal| signal.zone_index == zone.index);
            let analysis = self.analyze_zone(zone, objects, signal);

            if analysis.occupied {
                outcome.occupied.insert(zone.index);
            }
            outcome.zones.push(analysis);
        }

        outcome
    }

    /// Decide a single zone. Zones never influence each other.
    pub fn analyze_zone(
        &self,
        zone: &Zone,
        objects: &[DetectedObject],
        signal: Option<&ColorSignal>,
    ) -> ZoneAnalysis {
        let mut analysis = ZoneAnalysis::vacant(zone.index);

        if let Some(best) = self.best_candidate(zone, objects) {
            analysis.occupied = true;
            analysis.detection_method = DetectionMethod::ObjectDetection;
            analysis.confidence = best.confidence;
            analysis.best_overlap_ratio = best.overlap;
            analysis.occupant = Some(best.object);
        }

        if let Some(signal) = signal {
            analysis.color_confidence = signal.confidence_score;

            let confidence = signal.confidence_score;
            if !analysis.occupied && confidence > self.config.color_confirm_threshold_primary {
                analysis.occupied = true;
                analysis.detection_method = DetectionMethod::ColorAnalysis;
                analysis.confidence = confidence;
            } else if analysis.occupied && confidence > self.config.color_confirm_threshold_dual {
                analysis.detection_method = DetectionMethod::DualDetection;
            }
        }

        debug!(
            "Zone #{}: {} (conf: {:.3}) [{}] overlap {:.3}, color {:.3}",
            zone.index + 1,
            if analysis.occupied { "occupied" } else { "free" },
            analysis.confidence,
            analysis.detection_method,
            analysis.best_overlap_ratio,
            analysis.color_confidence
        );

        analysis
    }

    fn best_candidate(&self, zone: &Zone, objects: &[DetectedObject]) -> Option<Candidate> {
        if !zone.is_valid() {
            return None;
        }

        let mut best: Option<Candidate> = None;

        for (object, detected) in objects.iter().enumerate() {
            let center_in_zone = point_in_zone(detected.center, &zone.polygon);
            let overlap = overlap_ratio(&detected.bbox, &zone.polygon);

            if !(center_in_zone || overlap > self.config.overlap_threshold) {
                continue;
            }

            let candidate = Candidate {
                object,
                overlap,
                confidence: detected.confidence,
            };
            if candidate.beats(best.as_ref()) {
                best = Some(candidate);
            }
        }

        best
    }
}
