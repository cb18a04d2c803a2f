//! High-level image operations.
//!
//! [`Resizer`] combines the pure geometry in
//! [`calculations`](super::calculations) with backend execution. Each stage
//! takes the previous stage's value and returns a new one:
//!
//! ```text
//! load ──► SourceImage ──resize──► WorkingCanvas ──crop──► WorkingCanvas ──encode──► bytes
//! ```
//!
//! A canvas is moved into every step that replaces it, so the old buffer is
//! dropped as soon as its successor exists, and on every error path.

use super::backend::{Dimensions, ImageBackend};
use super::calculations::{auto_fit_mode, compute_fit_dimensions, plan_crop};
use super::error::ResizeError;
use super::params::{FitMode, FitRequest, Format, Quality, Rect};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// A decoded source raster with non-zero dimensions.
#[derive(Debug)]
pub struct SourceImage<R> {
    pixels: R,
    width: u32,
    height: u32,
}

impl<R> SourceImage<R> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &R {
        &self.pixels
    }
}

/// The raster produced by a resize or crop step.
#[derive(Debug)]
pub struct WorkingCanvas<R> {
    pixels: R,
    width: u32,
    height: u32,
}

impl<R> WorkingCanvas<R> {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &R {
        &self.pixels
    }

    pub fn into_pixels(self) -> R {
        self.pixels
    }
}

/// Drives fit, crop and encode against a backend.
///
/// Holds no pixel state of its own; one `Resizer` can serve many images,
/// including from several threads at once.
pub struct Resizer<'a, B: ImageBackend> {
    backend: &'a B,
    single_pass_auto: bool,
}

impl<'a, B: ImageBackend> Resizer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            single_pass_auto: false,
        }
    }

    /// Skip the orientation fit pass in [`auto_resize`](Self::auto_resize).
    ///
    /// The final pixels come from the crop pass either way; only the
    /// intermediate canvas goes away.
    pub fn single_pass_auto(mut self, enabled: bool) -> Self {
        self.single_pass_auto = enabled;
        self
    }

    /// Decode bytes into a source image.
    pub fn load(&self, bytes: &[u8], format: Format) -> Result<SourceImage<B::Raster>> {
        if !format.can_decode() {
            return Err(ResizeError::UnsupportedFormat(format.to_string()));
        }
        let pixels = self
            .backend
            .decode(bytes, format)
            .map_err(ResizeError::decode)?;
        let Dimensions { width, height } = self.backend.dimensions(&pixels);
        if width == 0 || height == 0 {
            return Err(ResizeError::InvalidSource { width, height });
        }
        log::debug!("decoded {format} source {width}x{height}");
        Ok(SourceImage {
            pixels,
            width,
            height,
        })
    }

    /// Read and decode a file, choosing the codec from its extension.
    pub fn load_path(&self, path: &Path) -> Result<SourceImage<B::Raster>> {
        let format = Format::from_path(path)?;
        let bytes = std::fs::read(path)?;
        self.load(&bytes, format)
    }

    /// Source dimensions from the file header alone.
    pub fn identify_path(&self, path: &Path) -> Result<(u32, u32)> {
        let format = Format::from_path(path)?;
        if !format.can_decode() {
            return Err(ResizeError::UnsupportedFormat(format.to_string()));
        }
        let bytes = std::fs::read(path)?;
        let dims = self
            .backend
            .identify(&bytes, format)
            .map_err(ResizeError::decode)?;
        Ok(dims.as_tuple())
    }

    /// Resample `source` to the size `request` calls for.
    ///
    /// For [`FitMode::Crop`] the covering canvas is then cropped to exactly the
    /// target, centered.
    pub fn resize(
        &self,
        source: &SourceImage<B::Raster>,
        request: &FitRequest,
    ) -> Result<WorkingCanvas<B::Raster>> {
        let (width, height) = compute_fit_dimensions(source.dimensions(), request)?;
        log::debug!(
            "{} fit {}x{} -> {width}x{height}",
            request.mode,
            source.width,
            source.height
        );

        let mut pixels = self
            .backend
            .allocate_canvas(width, height)
            .map_err(ResizeError::raster)?;
        self.backend
            .resample(
                &mut pixels,
                &source.pixels,
                Rect::sized(source.width, source.height),
                Rect::sized(width, height),
            )
            .map_err(ResizeError::raster)?;
        let canvas = WorkingCanvas {
            pixels,
            width,
            height,
        };

        match request.mode {
            FitMode::Crop => self.crop(canvas, request.target()?),
            _ => Ok(canvas),
        }
    }

    /// Cut a centered `target`-sized region out of `canvas`.
    ///
    /// The canvas must be at least as large as the target on both axes;
    /// anything smaller is [`ResizeError::InvalidCropRegion`].
    pub fn crop(
        &self,
        canvas: WorkingCanvas<B::Raster>,
        target: (u32, u32),
    ) -> Result<WorkingCanvas<B::Raster>> {
        let plan = plan_crop(canvas.dimensions(), target)?;
        log::debug!(
            "crop {}x{} at ({}, {}) from {}x{}",
            plan.width,
            plan.height,
            plan.offset_x,
            plan.offset_y,
            canvas.width,
            canvas.height
        );

        let mut pixels = self
            .backend
            .allocate_canvas(plan.width, plan.height)
            .map_err(ResizeError::raster)?;
        self.backend
            .resample(
                &mut pixels,
                &canvas.pixels,
                plan.rect(),
                Rect::sized(plan.width, plan.height),
            )
            .map_err(ResizeError::raster)?;

        Ok(WorkingCanvas {
            pixels,
            width: plan.width,
            height: plan.height,
        })
    }

    /// Resize to exactly the requested size, picking the fit from orientation.
    ///
    /// `request.mode` is ignored. Wide sources get a landscape fit, tall ones a
    /// portrait fit, square ones an exact fit; then the source is resized again
    /// in crop mode, which yields the final canvas. Unless
    /// [`single_pass_auto`](Self::single_pass_auto) is set, the first pass
    /// still runs and its canvas is discarded.
    pub fn auto_resize(
        &self,
        source: &SourceImage<B::Raster>,
        request: &FitRequest,
    ) -> Result<WorkingCanvas<B::Raster>> {
        let crop_request = request.with_mode(FitMode::Crop);
        crop_request.target()?;

        if !self.single_pass_auto {
            let mode = auto_fit_mode(source.dimensions());
            let fitted = self.resize(source, &request.with_mode(mode))?;
            log::debug!(
                "auto: {mode} pass gave {}x{}, cropping from source",
                fitted.width,
                fitted.height
            );
        }

        self.resize(source, &crop_request)
    }

    /// Encode the canvas, translating `quality` into the format's own scale.
    ///
    /// The canvas is consumed; its buffer is released once encoding returns.
    pub fn encode(
        &self,
        canvas: WorkingCanvas<B::Raster>,
        format: Format,
        quality: Quality,
    ) -> Result<Vec<u8>> {
        let native = format.encode_quality(quality);
        log::debug!(
            "encoding {}x{} as {format} ({native:?})",
            canvas.width,
            canvas.height
        );
        self.backend
            .encode(&canvas.pixels, format, native)
            .map_err(ResizeError::encode)
    }

    /// Encode and write to `path`, choosing the codec from its extension.
    pub fn save_path(
        &self,
        canvas: WorkingCanvas<B::Raster>,
        path: &Path,
        quality: Quality,
    ) -> Result<()> {
        let format = Format::from_path(path)?;
        let bytes = self.encode(canvas, format, quality)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
