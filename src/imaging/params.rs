//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) orchestrator (which
//! decides what canvases to create) and the [`backend`](super::backend)
//! (which does the actual pixel work).
//!
//! ## Types
//!
//! - [`FitMode`] / [`FitRequest`] — how the output size is derived from the target.
//! - [`Quality`] — caller-facing encode quality (0–100, default 100). Clamped on construction.
//! - [`Format`] — codec selected by file extension.
//! - [`EncodeQuality`] — quality translated into the format's native scale.
//! - [`ResampleFilter`] — interpolation used by every resample step.
//! - [`Rect`] — a rectangle in raster coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::error::ResizeError;

/// Policy for deriving output dimensions from a requested size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Stretch to exactly the requested size, ignoring aspect ratio.
    Exact,
    /// Fix the height, derive the width from the source aspect ratio.
    Portrait,
    /// Fix the width, derive the height from the source aspect ratio.
    Landscape,
    /// Scale to cover the target, then center-crop the overflow.
    Crop,
}

impl FitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FitMode::Exact => "exact",
            FitMode::Portrait => "portrait",
            FitMode::Landscape => "landscape",
            FitMode::Crop => "crop",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested output size plus the mode that interprets it.
///
/// Portrait only reads `height` and Landscape only reads `width`; Exact and
/// Crop need both. Use [`FitRequest::target`] to read the axes a mode needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: FitMode,
}

impl FitRequest {
    pub fn new(width: u32, height: u32, mode: FitMode) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            mode,
        }
    }

    pub fn exact(width: u32, height: u32) -> Self {
        Self::new(width, height, FitMode::Exact)
    }

    pub fn crop(width: u32, height: u32) -> Self {
        Self::new(width, height, FitMode::Crop)
    }

    pub fn portrait(height: u32) -> Self {
        Self {
            width: None,
            height: Some(height),
            mode: FitMode::Portrait,
        }
    }

    pub fn landscape(width: u32) -> Self {
        Self {
            width: Some(width),
            height: None,
            mode: FitMode::Landscape,
        }
    }

    /// Same target, different mode.
    pub fn with_mode(self, mode: FitMode) -> Self {
        Self { mode, ..self }
    }

    fn invalid(&self) -> ResizeError {
        ResizeError::InvalidTarget {
            mode: self.mode,
            width: self.width,
            height: self.height,
        }
    }

    /// The requested width, rejecting a missing or zero value.
    pub fn target_width(&self) -> Result<u32, ResizeError> {
        self.width.filter(|&w| w > 0).ok_or_else(|| self.invalid())
    }

    /// The requested height, rejecting a missing or zero value.
    pub fn target_height(&self) -> Result<u32, ResizeError> {
        self.height.filter(|&h| h > 0).ok_or_else(|| self.invalid())
    }

    /// Both axes, for modes that need a full target rectangle.
    pub fn target(&self) -> Result<(u32, u32), ResizeError> {
        Ok((self.target_width()?, self.target_height()?))
    }
}

/// Encode quality on a 0–100 scale, higher is better.
///
/// Only [`Quality::new`] builds one, so the value is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Quality expressed in the target codec's own terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeQuality {
    /// Lossy quality, 0–100, higher is better.
    Lossy(u8),
    /// Compression level, 0–9, where 0 is treated as best.
    Level(u8),
    /// The codec takes no quality parameter.
    Lossless,
}

/// Image codecs, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Gif,
    WebP,
    /// Encode only: there is no AVIF decoder compiled in.
    Avif,
}

const EXTENSIONS: &[(&str, Format)] = &[
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("png", Format::Png),
    ("gif", Format::Gif),
    ("webp", Format::WebP),
    ("avif", Format::Avif),
];

impl Format {
    /// Look up a format by bare extension (`"JPG"`, `"png"`), case-insensitive.
    pub fn from_extension(ext: &str) -> Result<Self, ResizeError> {
        EXTENSIONS
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, fmt)| *fmt)
            .ok_or_else(|| ResizeError::UnsupportedFormat(ext.to_string()))
    }

    /// Dispatch on a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, ResizeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ResizeError::UnsupportedFormat(path.display().to_string()))?;
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => "jpg",
            Format::Png => "png",
            Format::Gif => "gif",
            Format::WebP => "webp",
            Format::Avif => "avif",
        }
    }

    pub fn can_decode(self) -> bool {
        !matches!(self, Format::Avif)
    }

    /// Translate a 0–100 quality into this format's native scale.
    ///
    /// PNG's level is inverted (0 is best) and coarser (0–9), so the value is
    /// flipped and rescaled, rounding half up: 100 → 0, 50 → 5, 0 → 9.
    pub fn encode_quality(self, quality: Quality) -> EncodeQuality {
        let q = quality.value();
        match self {
            Format::Jpeg | Format::Avif => EncodeQuality::Lossy(q as u8),
            Format::Png => {
                let inverted = 100 - q;
                let level = (inverted as f64 / 100.0 * 9.0).round() as u8;
                EncodeQuality::Level(level)
            }
            Format::Gif | Format::WebP => EncodeQuality::Lossless,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Extensions with a decoder compiled in.
pub fn supported_input_extensions() -> impl Iterator<Item = &'static str> {
    EXTENSIONS
        .iter()
        .filter(|(_, fmt)| fmt.can_decode())
        .map(|(ext, _)| *ext)
}

/// Interpolation filter used for every resample step.
///
/// Nearest-neighbor is intentionally absent: shrinking must stay smooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    #[default]
    Lanczos3,
    CatmullRom,
    Gaussian,
    Triangle,
}

/// An axis-aligned rectangle in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Whether this rectangle lies entirely inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}
