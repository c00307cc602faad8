//! Frame-level occupancy detection

pub mod config;
pub mod detector;

pub use config::{DetectorConfig, OccupancyConfig, VisualizationConfig};
pub use detector::{OccupancyDetector, OccupancyResult};
