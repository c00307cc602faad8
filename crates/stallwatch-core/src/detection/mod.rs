//! Detector output: objects, significance filtering, suppression

pub mod nms;
pub mod object;
pub mod significance;

pub use nms::suppress_overlaps;
pub use object::{DetectedObject, RawDetection};
pub use significance::{SignificanceFilter, Verdict};
