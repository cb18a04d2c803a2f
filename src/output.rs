//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! photo.jpg 800x600 → 200x200
//!     Output: thumbs/photo.jpg
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 cover.jpg 800x600 → 200x200
//!     Output: out/cover.jpg
//! 002 broken.png failed
//!     Error: Resize failed: Decode failed: invalid PNG signature
//!
//! Resized 1 of 2 images, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{BatchSummary, ProcessEvent, Processed};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn format_size(size: (u32, u32)) -> String {
    format!("{}x{}", size.0, size.1)
}

/// The file name alone, or the whole path when there is none.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Single resize
// ============================================================================

pub fn format_resize_output(input: &Path, output: &Path, processed: &Processed) -> Vec<String> {
    vec![
        format!(
            "{} {} \u{2192} {}",
            file_label(input),
            format_size(processed.source),
            format_size(processed.output)
        ),
        format!("    Output: {}", output.display()),
    ]
}

pub fn print_resize_output(input: &Path, output: &Path, processed: &Processed) {
    for line in format_resize_output(input, output, processed) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Resized {
            index,
            input,
            output,
            source,
            size,
        } => vec![
            format!(
                "{} {} {} \u{2192} {}",
                format_index(*index),
                file_label(input),
                format_size(*source),
                format_size(*size)
            ),
            format!("    Output: {}", output.display()),
        ],
        ProcessEvent::Failed {
            index,
            input,
            error,
        } => vec![
            format!("{} {} failed", format_index(*index), file_label(input)),
            format!("    Error: {}", error),
        ],
    }
}

pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let noun = if summary.total() == 1 { "image" } else { "images" };
    let mut line = format!(
        "Resized {} of {} {}",
        summary.succeeded,
        summary.total(),
        noun
    );
    if !summary.failed.is_empty() {
        line.push_str(&format!(", {} failed", summary.failed.len()));
    }
    vec![String::new(), line]
}

pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
