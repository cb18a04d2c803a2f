//! # Simple Fit
//!
//! Aspect-aware image resizing. Given a source image and a target size, pick
//! output dimensions under one of four strategies, resample, and optionally
//! center-crop the overflow:
//!
//! | Mode | Output |
//! |------|--------|
//! | `exact` | exactly `width x height`, aspect ignored |
//! | `portrait` | height fixed, width follows the source aspect |
//! | `landscape` | width fixed, height follows the source aspect |
//! | `crop` | scale to cover `width x height`, then cut the centered target |
//!
//! An `auto` mode chooses landscape, portrait or exact from the source's
//! orientation and always ends with a crop to exactly the target.
//!
//! # Pipeline
//!
//! ```text
//! bytes ──decode──► SourceImage ──resize──► WorkingCanvas ──crop──► WorkingCanvas ──encode──► bytes
//! ```
//!
//! Every geometry decision is a pure function in [`imaging`]; pixels only
//! move inside an [`imaging::ImageBackend`]. That split keeps the dimension
//! math property-testable and lets the orchestration be tested against a
//! recording mock.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry calculator, resize orchestrator, `image`-crate backend |
//! | [`process`] | Directory batch runs in parallel with progress events |
//! | [`config`] | `simple-fit.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Formats
//!
//! JPEG, PNG, GIF and WebP decode and encode. AVIF encodes only. The codec is
//! always chosen from the file extension, case-insensitively; anything else is
//! [`imaging::ResizeError::UnsupportedFormat`].

pub mod config;
pub mod imaging;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
