//! Stall layout

pub mod registry;

pub use registry::{LayoutSource, Zone, ZoneRegistry};
