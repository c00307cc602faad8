//! Utility modules

pub mod annotate;
pub mod image;

pub use annotate::Annotator;
pub use image::ImageUtils;
