//! Whole-frame failures
//!
//! Anything listed here aborts the analysis of a frame. Per-zone and
//! per-object problems are absorbed inside the pipeline instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OccupancyError {
    #[error("could not decode image: {0}")]
    InvalidImage(String),

    #[error("object detector failed: {0:#}")]
    Detector(anyhow::Error),

    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}
