//! Stallwatch Computer Vision Library
//!
//! Pixel-level evidence and the frame pipeline for stall occupancy, on top
//! of OpenCV.

pub mod backends;
pub mod color;
pub mod detection;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use backends::{FixedDetector, ReplayDetector};
pub use color::{ColorAnalysisConfig, ColorAnalyzer};
pub use detection::{OccupancyConfig, OccupancyDetector, OccupancyResult};
pub use error::OccupancyError;
pub use traits::ObjectDetector;
pub use utils::{Annotator, ImageUtils};

// Error handling
pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

/// Core traits for the CV system
pub mod traits {
    use super::*;
    use opencv::core::Mat;
    use stallwatch_core::RawDetection;

    /// External object detection capability.
    ///
    /// Constructed once by the host and injected into the pipeline. The
    /// frame is BGR and must be treated as read-only.
    pub trait ObjectDetector: Send {
        /// Backend identifier for logs
        fn name(&self) -> &str;

        /// Detect every object in the frame, whatever its class
        fn detect(&mut self, image: &Mat) -> Result<Vec<RawDetection>>;

        /// Optional warm-up hook
        fn warm_up(&mut self) -> Result<()> {
            Ok(())
        }
    }
}
