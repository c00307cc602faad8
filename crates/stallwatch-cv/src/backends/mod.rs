//! Object detector backends

mod fixed;
mod replay;

pub use fixed::FixedDetector;
pub use replay::ReplayDetector;
