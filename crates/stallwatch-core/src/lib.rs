//! Stallwatch core
//!
//! Geometry, filtering and decision logic for parking stall occupancy.
//! Everything here is pure: pixel work lives in `stallwatch-cv`.

pub mod color;
pub mod detection;
pub mod fusion;
pub mod geometry;
pub mod report;
pub mod stats;
pub mod zones;

// Re-export commonly used types
pub use color::{ColorMetrics, ColorSignal};
pub use detection::{DetectedObject, RawDetection, SignificanceFilter};
pub use fusion::{DetectionMethod, FusionConfig, FusionEngine, FusionOutcome, ZoneAnalysis};
pub use geometry::{BBox, Point};
pub use report::{FailureReport, FrameReport};
pub use stats::OccupancySummary;
pub use zones::{Zone, ZoneRegistry};
