//! Pure Rust codec backend built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, WebP) | `image::load_from_memory_with_format` → RGBA8 |
//! | Resample | `image::imageops::resize`, Lanczos3 by default |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` (alpha dropped) |
//! | Encode → PNG | `PngEncoder::new_with_quality`, deflate level 0–9 (0 = stored) |
//! | Encode → GIF | `GifEncoder` |
//! | Encode → WebP | `WebPEncoder::new_lossless` |
//! | Encode → AVIF | `AvifEncoder` (rav1e, speed 6) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeQuality, Format, Rect, ResampleFilter};
use image::codecs::avif::AvifEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{self, CompressionType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::{self, FilterType};
use image::buffer::ConvertBuffer;
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage, RgbaImage,
};
use std::io::Cursor;

/// Largest canvas the backend will allocate, in bytes of RGBA8.
const MAX_CANVAS_BYTES: u64 = 1 << 32;

/// Backend using the `image` crate, working in RGBA8 throughout.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    filter: ResampleFilter,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::with_filter(ResampleFilter::default())
    }

    pub fn with_filter(filter: ResampleFilter) -> Self {
        Self { filter }
    }

    fn filter_type(&self) -> FilterType {
        match self.filter {
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Triangle => FilterType::Triangle,
        }
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(format: Format) -> ImageFormat {
    match format {
        Format::Jpeg => ImageFormat::Jpeg,
        Format::Png => ImageFormat::Png,
        Format::Gif => ImageFormat::Gif,
        Format::WebP => ImageFormat::WebP,
        Format::Avif => ImageFormat::Avif,
    }
}

/// Deflate level for PNG. Level 0 stores the data uncompressed.
fn png_compression(level: u8) -> CompressionType {
    match level {
        0 => CompressionType::Uncompressed,
        n => CompressionType::Level(n.min(9)),
    }
}

fn failed(context: &str, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{context}: {err}"))
}

impl ImageBackend for RustBackend {
    type Raster = RgbaImage;

    fn identify(&self, bytes: &[u8], format: Format) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::with_format(Cursor::new(bytes), image_format(format))
            .into_dimensions()
            .map_err(|e| failed("Failed to read dimensions", e))?;
        Ok(Dimensions { width, height })
    }

    fn decode(&self, bytes: &[u8], format: Format) -> Result<RgbaImage, BackendError> {
        image::load_from_memory_with_format(bytes, image_format(format))
            .map(DynamicImage::into_rgba8)
            .map_err(|e| failed(&format!("Failed to decode {format}"), e))
    }

    fn dimensions(&self, raster: &RgbaImage) -> Dimensions {
        let (width, height) = raster.dimensions();
        Dimensions { width, height }
    }

    fn allocate_canvas(&self, width: u32, height: u32) -> Result<RgbaImage, BackendError> {
        let bytes = width as u64 * height as u64 * 4;
        if width == 0 || height == 0 || bytes > MAX_CANVAS_BYTES {
            return Err(BackendError::ProcessingFailed(format!(
                "Cannot allocate {width}x{height} canvas"
            )));
        }
        Ok(RgbaImage::new(width, height))
    }

    fn resample(
        &self,
        dst: &mut RgbaImage,
        src: &RgbaImage,
        src_rect: Rect,
        dst_rect: Rect,
    ) -> Result<(), BackendError> {
        if !src_rect.fits_within(src.width(), src.height())
            || !dst_rect.fits_within(dst.width(), dst.height())
        {
            return Err(BackendError::ProcessingFailed(format!(
                "Resample {src_rect:?} -> {dst_rect:?} out of bounds"
            )));
        }

        let region = imageops::crop_imm(
            src,
            src_rect.x,
            src_rect.y,
            src_rect.width,
            src_rect.height,
        );
        // The view is read in place; only the resized patch is allocated.
        let patch = if (src_rect.width, src_rect.height) == (dst_rect.width, dst_rect.height) {
            region.to_image()
        } else {
            imageops::resize(
                &*region,
                dst_rect.width,
                dst_rect.height,
                self.filter_type(),
            )
        };
        imageops::replace(dst, &patch, dst_rect.x as i64, dst_rect.y as i64);
        Ok(())
    }

    fn encode(
        &self,
        raster: &RgbaImage,
        format: Format,
        quality: EncodeQuality,
    ) -> Result<Vec<u8>, BackendError> {
        let (width, height) = raster.dimensions();
        let mut buf = Vec::new();

        match (format, quality) {
            (Format::Jpeg, EncodeQuality::Lossy(q)) => {
                // JPEG has no alpha channel
                let rgb: RgbImage = raster.convert();
                JpegEncoder::new_with_quality(&mut buf, q.clamp(1, 100))
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| failed("JPEG encode failed", e))?;
            }
            (Format::Avif, EncodeQuality::Lossy(q)) => {
                AvifEncoder::new_with_speed_quality(&mut buf, 6, q.clamp(1, 100))
                    .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| failed("AVIF encode failed", e))?;
            }
            (Format::Png, EncodeQuality::Level(level)) => {
                PngEncoder::new_with_quality(
                    &mut buf,
                    png_compression(level),
                    png::FilterType::Adaptive,
                )
                .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| failed("PNG encode failed", e))?;
            }
            (Format::Gif, EncodeQuality::Lossless) => {
                let mut encoder = GifEncoder::new(&mut buf);
                encoder
                    .encode(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| failed("GIF encode failed", e))?;
            }
            (Format::WebP, EncodeQuality::Lossless) => {
                WebPEncoder::new_lossless(&mut buf)
                    .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| failed("WebP encode failed", e))?;
            }
            (format, quality) => {
                return Err(BackendError::ProcessingFailed(format!(
                    "{quality:?} does not apply to {format}"
                )));
            }
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient, split_red_blue, write_png};
    use tempfile::TempDir;

    fn roundtrip(
        backend: &RustBackend,
        img: &RgbaImage,
        format: Format,
        q: EncodeQuality,
    ) -> RgbaImage {
        let bytes = backend.encode(img, format, q).unwrap();
        backend.decode(&bytes, format).unwrap()
    }

    #[test]
    fn identify_reads_header() {
        let backend = RustBackend::new();
        let bytes = backend
            .encode(&gradient(200, 150), Format::Png, EncodeQuality::Level(5))
            .unwrap();
        let dims = backend.identify(&bytes, Format::Png).unwrap();
        assert_eq!(dims.as_tuple(), (200, 150));
    }

    #[test]
    fn decodes_file_written_by_image_crate() {
        let tmp = TempDir::new().unwrap();
        let path = write_png(tmp.path(), "nested/source.png", 48, 36);
        let bytes = std::fs::read(&path).unwrap();

        let backend = RustBackend::new();
        let raster = backend.decode(&bytes, Format::Png).unwrap();
        assert_eq!(raster, gradient(48, 36));
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        assert!(backend.decode(b"definitely not a jpeg", Format::Jpeg).is_err());
    }

    #[test]
    fn jpeg_roundtrip_keeps_size() {
        let backend = RustBackend::new();
        let decoded = roundtrip(
            &backend,
            &gradient(64, 48),
            Format::Jpeg,
            EncodeQuality::Lossy(85),
        );
        assert_eq!(decoded.dimensions(), (64, 48));
    }

    #[test]
    fn png_roundtrip_is_lossless() {
        let backend = RustBackend::new();
        let img = gradient(32, 16);
        for level in [0, 5, 9] {
            let decoded = roundtrip(&backend, &img, Format::Png, EncodeQuality::Level(level));
            assert_eq!(decoded, img, "level {level}");
        }
    }

    #[test]
    fn gif_and_webp_roundtrip_keep_size() {
        let backend = RustBackend::new();
        let img = gradient(40, 30);
        for format in [Format::Gif, Format::WebP] {
            let decoded = roundtrip(&backend, &img, format, EncodeQuality::Lossless);
            assert_eq!(decoded.dimensions(), (40, 30), "{format}");
        }
    }

    #[test]
    fn avif_encode_produces_output() {
        let backend = RustBackend::new();
        let bytes = backend
            .encode(&gradient(32, 32), Format::Avif, EncodeQuality::Lossy(80))
            .unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn mismatched_quality_is_rejected() {
        let backend = RustBackend::new();
        let result = backend.encode(&gradient(4, 4), Format::Jpeg, EncodeQuality::Level(3));
        assert!(result.is_err());
    }

    #[test]
    fn png_levels_map_to_deflate_levels() {
        assert_eq!(png_compression(0), CompressionType::Uncompressed);
        assert_eq!(png_compression(1), CompressionType::Level(1));
        assert_eq!(png_compression(5), CompressionType::Level(5));
        assert_eq!(png_compression(9), CompressionType::Level(9));
        assert_eq!(png_compression(12), CompressionType::Level(9));
    }

    #[test]
    fn png_level_changes_encoded_size() {
        let backend = RustBackend::new();
        let img = gradient(256, 256);
        let size = |level| {
            backend
                .encode(&img, Format::Png, EncodeQuality::Level(level))
                .unwrap()
                .len()
        };
        let stored = size(0);
        // 256x256 RGBA is 256 KiB of raw samples
        assert!(stored > 256 * 256 * 4, "level 0 size {stored}");
        assert!(stored > size(2));
        assert!(stored > size(9));
        assert_ne!(size(0), size(1));
    }

    #[test]
    fn allocate_zero_canvas_errors() {
        let backend = RustBackend::new();
        assert!(backend.allocate_canvas(0, 10).is_err());
        assert_eq!(backend.allocate_canvas(3, 2).unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn resample_scales_whole_image() {
        let backend = RustBackend::new();
        let src = gradient(200, 100);
        let mut dst = backend.allocate_canvas(50, 25).unwrap();
        backend
            .resample(&mut dst, &src, Rect::sized(200, 100), Rect::sized(50, 25))
            .unwrap();
        assert_eq!(dst.dimensions(), (50, 25));
    }

    #[test]
    fn resample_same_size_copies_region() {
        let backend = RustBackend::new();
        // Left half red, right half blue; take the right 10 columns
        let src = split_red_blue(20, 10);
        let mut dst = backend.allocate_canvas(10, 10).unwrap();
        backend
            .resample(&mut dst, &src, Rect::new(10, 0, 10, 10), Rect::sized(10, 10))
            .unwrap();
        assert!(dst.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn resample_out_of_bounds_errors() {
        let backend = RustBackend::new();
        let src = gradient(20, 20);
        let mut dst = backend.allocate_canvas(10, 10).unwrap();
        let result = backend.resample(&mut dst, &src, Rect::new(15, 0, 10, 10), Rect::sized(10, 10));
        assert!(result.is_err());
    }

    #[test]
    fn every_filter_resamples() {
        let src = gradient(30, 30);
        for filter in [
            ResampleFilter::Lanczos3,
            ResampleFilter::CatmullRom,
            ResampleFilter::Gaussian,
            ResampleFilter::Triangle,
        ] {
            let backend = RustBackend::with_filter(filter);
            let mut dst = backend.allocate_canvas(10, 10).unwrap();
            backend
                .resample(&mut dst, &src, Rect::sized(30, 30), Rect::sized(10, 10))
                .unwrap();
        }
    }
}
