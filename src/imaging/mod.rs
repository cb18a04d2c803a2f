//! Image resizing — geometry, orchestration, and codecs.
//!
//! | Operation | Where |
//! |---|---|
//! | **Fit dimensions** | [`compute_fit_dimensions`] (exact, portrait, landscape, crop) |
//! | **Centered crop** | [`plan_crop`], [`Resizer::crop`] |
//! | **Orientation auto-fit** | [`Resizer::auto_resize`] |
//! | **Decode / resample / encode** | [`RustBackend`] (`image` crate, Lanczos3) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing requests, formats and quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`Resizer`], which combines calculations + backend

pub mod backend;
mod calculations;
mod error;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CropPlan, FitPlan, auto_fit_mode, compute_fit_dimensions, optimal_crop_dimensions, plan_auto,
    plan_crop, plan_fit, size_by_fixed_height, size_by_fixed_width,
};
pub use error::ResizeError;
pub use operations::{Resizer, SourceImage, WorkingCanvas};
pub use params::{
    EncodeQuality, FitMode, FitRequest, Format, Quality, Rect, ResampleFilter,
    supported_input_extensions,
};
pub use rust_backend::RustBackend;
