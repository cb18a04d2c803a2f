//! Pure calculation functions for resize geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Rounding
//!
//! Ratios rarely divide evenly, so every computed dimension is rounded half
//! up (`f64::round` on a non-negative value) and clamped to at least one
//! pixel. Crop offsets are floored: `(canvas - target) / 2` in integer math.
//! These are the only two rules; every site below uses one of them.

use super::error::ResizeError;
use super::params::{FitMode, FitRequest, Rect};
use serde::Serialize;

fn to_pixels(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

fn check_source(source: (u32, u32)) -> Result<(), ResizeError> {
    let (width, height) = source;
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidSource { width, height });
    }
    Ok(())
}

/// Width that keeps the source aspect ratio at a fixed height.
///
/// # Examples
/// ```
/// # use simple_fit::imaging::size_by_fixed_height;
/// // 400x800 portrait at height 100 → width 50
/// assert_eq!(size_by_fixed_height((400, 800), 100).unwrap(), 50);
/// ```
pub fn size_by_fixed_height(source: (u32, u32), target_height: u32) -> Result<u32, ResizeError> {
    check_source(source)?;
    if target_height == 0 {
        return Err(ResizeError::InvalidTarget {
            mode: FitMode::Portrait,
            width: None,
            height: Some(target_height),
        });
    }
    let ratio = source.0 as f64 / source.1 as f64;
    Ok(to_pixels(target_height as f64 * ratio))
}

/// Height that keeps the source aspect ratio at a fixed width.
///
/// # Examples
/// ```
/// # use simple_fit::imaging::size_by_fixed_width;
/// // 800x600 landscape at width 400 → height 300
/// assert_eq!(size_by_fixed_width((800, 600), 400).unwrap(), 300);
/// ```
pub fn size_by_fixed_width(source: (u32, u32), target_width: u32) -> Result<u32, ResizeError> {
    check_source(source)?;
    if target_width == 0 {
        return Err(ResizeError::InvalidTarget {
            mode: FitMode::Landscape,
            width: Some(target_width),
            height: None,
        });
    }
    let ratio = source.1 as f64 / source.0 as f64;
    Ok(to_pixels(target_width as f64 * ratio))
}

/// Dimensions that cover the target area while keeping the source aspect ratio.
///
/// The source is scaled by the smaller of the two axis ratios, so one axis
/// lands on the target and the other overshoots it. The overshoot is what a
/// later centered crop removes.
///
/// # Examples
/// ```
/// # use simple_fit::imaging::optimal_crop_dimensions;
/// // 800x600 into 200x200: height ratio 3.0 wins, width 266.67 rounds to 267
/// assert_eq!(optimal_crop_dimensions((800, 600), (200, 200)).unwrap(), (267, 200));
/// ```
pub fn optimal_crop_dimensions(
    source: (u32, u32),
    target: (u32, u32),
) -> Result<(u32, u32), ResizeError> {
    let (tgt_w, tgt_h) = target;
    if tgt_w == 0 || tgt_h == 0 {
        return Err(ResizeError::InvalidTarget {
            mode: FitMode::Crop,
            width: Some(tgt_w),
            height: Some(tgt_h),
        });
    }
    check_source(source)?;
    let (src_w, src_h) = source;

    let height_ratio = src_h as f64 / tgt_h as f64;
    let width_ratio = src_w as f64 / tgt_w as f64;
    let optimal_ratio = height_ratio.min(width_ratio);

    // Float error must not undercut the target on either axis.
    let width = to_pixels(src_w as f64 / optimal_ratio).max(tgt_w);
    let height = to_pixels(src_h as f64 / optimal_ratio).max(tgt_h);
    Ok((width, height))
}

/// Canvas dimensions for a fit request, before any crop.
pub fn compute_fit_dimensions(
    source: (u32, u32),
    request: &FitRequest,
) -> Result<(u32, u32), ResizeError> {
    check_source(source)?;
    match request.mode {
        FitMode::Exact => request.target(),
        FitMode::Portrait => {
            let height = request.target_height()?;
            Ok((size_by_fixed_height(source, height)?, height))
        }
        FitMode::Landscape => {
            let width = request.target_width()?;
            Ok((width, size_by_fixed_width(source, width)?))
        }
        FitMode::Crop => optimal_crop_dimensions(source, request.target()?),
    }
}

/// A centered crop rectangle inside a pre-crop canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropPlan {
    pub offset_x: u32,
    pub offset_y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropPlan {
    pub fn rect(&self) -> Rect {
        Rect::new(self.offset_x, self.offset_y, self.width, self.height)
    }
}

/// Center a `target` rectangle inside `canvas`, flooring odd remainders.
///
/// A target larger than the canvas on either axis is rejected rather than
/// clamped.
pub fn plan_crop(canvas: (u32, u32), target: (u32, u32)) -> Result<CropPlan, ResizeError> {
    let (tgt_w, tgt_h) = target;
    if tgt_w == 0 || tgt_h == 0 {
        return Err(ResizeError::InvalidTarget {
            mode: FitMode::Crop,
            width: Some(tgt_w),
            height: Some(tgt_h),
        });
    }
    if tgt_w > canvas.0 || tgt_h > canvas.1 {
        return Err(ResizeError::InvalidCropRegion { canvas, target });
    }
    Ok(CropPlan {
        offset_x: (canvas.0 - tgt_w) / 2,
        offset_y: (canvas.1 - tgt_h) / 2,
        width: tgt_w,
        height: tgt_h,
    })
}

/// The fit mode chosen from source orientation alone.
///
/// Wide sources fix the width, tall sources fix the height, and square
/// sources stretch exactly.
pub fn auto_fit_mode(source: (u32, u32)) -> FitMode {
    let (w, h) = source;
    if w > h {
        FitMode::Landscape
    } else if w < h {
        FitMode::Portrait
    } else {
        FitMode::Exact
    }
}

/// Full geometry of one resize pass, computed without touching pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FitPlan {
    pub mode: FitMode,
    pub source: (u32, u32),
    /// Size of the resampled canvas before any crop.
    pub canvas: (u32, u32),
    pub crop: Option<CropPlan>,
    /// Size of the canvas this pass hands on.
    pub output: (u32, u32),
}

/// Plan a single resize pass.
pub fn plan_fit(source: (u32, u32), request: &FitRequest) -> Result<FitPlan, ResizeError> {
    let canvas = compute_fit_dimensions(source, request)?;
    let crop = match request.mode {
        FitMode::Crop => Some(plan_crop(canvas, request.target()?)?),
        _ => None,
    };
    let output = crop.map(|c| (c.width, c.height)).unwrap_or(canvas);
    Ok(FitPlan {
        mode: request.mode,
        source,
        canvas,
        crop,
        output,
    })
}

/// Plan an orientation-driven resize: a fit pass, then a crop pass.
///
/// Both passes read the original source and the crop pass alone decides the
/// final pixels. The fit pass is dropped when `single_pass` is set.
pub fn plan_auto(
    source: (u32, u32),
    request: &FitRequest,
    single_pass: bool,
) -> Result<Vec<FitPlan>, ResizeError> {
    check_source(source)?;
    let crop_request = request.with_mode(FitMode::Crop);
    crop_request.target()?;

    let mut passes = Vec::with_capacity(2);
    if !single_pass {
        passes.push(plan_fit(source, &request.with_mode(auto_fit_mode(source)))?);
    }
    passes.push(plan_fit(source, &crop_request)?);
    Ok(passes)
}
