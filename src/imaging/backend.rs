//! Codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the narrow interface between the resize
//! orchestrator and whatever library owns pixels. It covers exactly what the
//! pipeline needs: read a header, decode, allocate a blank canvas, resample a
//! rectangle from one raster into another, and encode.
//!
//! The raster type is associated rather than fixed, so the orchestrator never
//! inspects pixels. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{EncodeQuality, Format, Rect};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for codec backends.
///
/// `Sync` so one backend can serve a rayon batch; each raster is still owned
/// by exactly one pipeline at a time.
pub trait ImageBackend: Sync {
    /// Backend-owned pixel buffer.
    type Raster: Send;

    /// Read dimensions from the encoded header without a full decode.
    fn identify(&self, bytes: &[u8], format: Format) -> Result<Dimensions, BackendError>;

    /// Decode encoded bytes into a raster.
    fn decode(&self, bytes: &[u8], format: Format) -> Result<Self::Raster, BackendError>;

    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// A blank raster of the given size.
    fn allocate_canvas(&self, width: u32, height: u32) -> Result<Self::Raster, BackendError>;

    /// Interpolated copy of `src_rect` in `src` onto `dst_rect` in `dst`.
    fn resample(
        &self,
        dst: &mut Self::Raster,
        src: &Self::Raster,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<(), BackendError>;

    /// Encode a raster with a quality already translated for `format`.
    fn encode(
        &self,
        raster: &Self::Raster,
        format: Format,
        quality: EncodeQuality,
    ) -> Result<Vec<u8>, BackendError>;
}
