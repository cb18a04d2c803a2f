//! Resize configuration module.
//!
//! Handles loading, validating, and merging `simple-fit.toml`. Stock defaults
//! are the base layer; a user file overrides only the keys it names, and CLI
//! flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [resize]
//! mode = "crop"          # exact | portrait | landscape | crop | auto
//! width = 200            # Target width (unused by portrait)
//! height = 200           # Target height (unused by landscape)
//! filter = "lanczos3"    # lanczos3 | catmull-rom | gaussian | triangle
//!
//! [output]
//! quality = 100          # 0 = worst, 100 = best
//! # format = "webp"      # Re-encode everything to one format
//!
//! [auto]
//! single_pass = false    # Skip the orientation pass in auto mode
//!
//! [processing]
//! max_processes = 4      # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{FitMode, FitRequest, Format, ResampleFilter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "simple-fit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target size and fit strategy.
    pub resize: ResizeConfig,
    /// Encode settings.
    pub output: OutputConfig,
    /// Orientation-driven mode settings.
    pub auto: AutoConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 0-100".into(),
            ));
        }
        if self.resize.width == Some(0) || self.resize.height == Some(0) {
            return Err(ConfigError::Validation(
                "resize.width and resize.height must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// How the output size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Exact,
    Portrait,
    Landscape,
    Crop,
    /// Pick landscape, portrait or exact from the source, then crop to size.
    Auto,
}

impl ResizeMode {
    /// The explicit fit mode, or `None` for auto.
    pub fn fit_mode(self) -> Option<FitMode> {
        match self {
            ResizeMode::Exact => Some(FitMode::Exact),
            ResizeMode::Portrait => Some(FitMode::Portrait),
            ResizeMode::Landscape => Some(FitMode::Landscape),
            ResizeMode::Crop => Some(FitMode::Crop),
            ResizeMode::Auto => None,
        }
    }
}

/// Target size and fit strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub mode: ResizeMode,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Interpolation for every resample step.
    pub filter: ResampleFilter,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Crop,
            width: Some(200),
            height: Some(200),
            filter: ResampleFilter::default(),
        }
    }
}

impl ResizeConfig {
    /// The fit request these settings describe.
    ///
    /// Auto mode reports [`FitMode::Crop`], since a crop pass is what
    /// decides its final size.
    pub fn request(&self) -> FitRequest {
        FitRequest {
            width: self.width,
            height: self.height,
            mode: self.mode.fit_mode().unwrap_or(FitMode::Crop),
        }
    }
}

/// Encode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Encode quality (0 = worst, 100 = best).
    pub quality: u32,
    /// Output format for batch runs. When absent, each file keeps its own.
    pub format: Option<Format>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: 100,
            format: None,
        }
    }
}

/// Auto mode settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoConfig {
    /// Skip the orientation fit pass; only the crop pass runs.
    pub single_pass: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `simple-fit.toml` from a directory, if there is one.
///
/// Falls back to stock defaults when the file is absent.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let overlay = if path.exists() {
        Some(load_raw_config(&path)?)
    } else {
        None
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-fit configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
# Command-line flags override anything set here.

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# How the output size is derived from width/height:
#   exact     - stretch to exactly width x height
#   portrait  - fix the height, scale the width to keep the aspect ratio
#   landscape - fix the width, scale the height to keep the aspect ratio
#   crop      - scale to cover width x height, then center-crop the overflow
#   auto      - choose landscape/portrait/exact from the image, then crop
mode = "crop"
width = 200
height = 200

# Resampling filter: lanczos3, catmull-rom, gaussian, triangle.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Encode quality (0 = worst, 100 = best). JPEG and AVIF use it directly,
# PNG maps it onto compression level 0-9, GIF and WebP ignore it.
quality = 100

# Re-encode every batch output to one format (jpg, png, gif, webp, avif).
# Omit to keep each file's own format.
# format = "webp"

# ---------------------------------------------------------------------------
# Auto mode
# ---------------------------------------------------------------------------
[auto]
# Auto mode runs an orientation fit and then a crop pass. The crop pass alone
# decides the output; set this to skip the first pass.
single_pass = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers for batch runs.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
