//! Error type for the resize pipeline.
//!
//! Every failure in geometry, codec dispatch, or backend execution surfaces as
//! a [`ResizeError`]. Nothing is retried and nothing falls back to a no-op:
//! an unrecognized extension or a degenerate source is an error the caller
//! sees, never a silently skipped step.

use super::backend::BackendError;
use super::params::FitMode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    /// The decoded source has a zero-length axis.
    #[error("Invalid source image: {width}x{height}")]
    InvalidSource { width: u32, height: u32 },

    /// A target axis the fit mode needs is missing or zero.
    #[error("Invalid target for {mode} fit: width={width:?} height={height:?}")]
    InvalidTarget {
        mode: FitMode,
        width: Option<u32>,
        height: Option<u32>,
    },

    /// A crop rectangle would extend past the canvas. Always a caller bug.
    #[error(
        "Crop region {}x{} does not fit inside {}x{} canvas",
        .target.0, .target.1, .canvas.0, .canvas.1
    )]
    InvalidCropRegion {
        canvas: (u32, u32),
        target: (u32, u32),
    },

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    /// Canvas allocation or resampling failed inside the backend.
    #[error("Raster operation failed: {0}")]
    Raster(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResizeError {
    pub(crate) fn decode(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => Self::Io(e),
            BackendError::ProcessingFailed(msg) => Self::Decode(msg),
        }
    }

    pub(crate) fn encode(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => Self::Io(e),
            BackendError::ProcessingFailed(msg) => Self::Encode(msg),
        }
    }

    pub(crate) fn raster(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => Self::Io(e),
            BackendError::ProcessingFailed(msg) => Self::Raster(msg),
        }
    }
}
