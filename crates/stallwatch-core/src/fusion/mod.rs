//! Occupancy fusion: detections + color evidence -> zone verdicts

pub mod config;
pub mod engine;

pub use config::{ColorWeights, FusionConfig};
pub use engine::{DetectionMethod, FusionEngine, FusionOutcome, ZoneAnalysis};
