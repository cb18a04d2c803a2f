//! Batch resizing over a directory tree.
//!
//! [`collect_jobs`] walks an input directory and pairs every decodable image
//! with an output path at the same relative location under the output
//! directory. [`process_batch`] then runs the jobs in parallel with
//! [rayon](https://docs.rs/rayon), one [`Resizer`] pipeline per image.
//!
//! ## Output Structure
//!
//! ```text
//! photos/                       out/
//! ├── cover.jpg           ──►   ├── cover.jpg        # 200x200 crop
//! ├── notes.txt                 │                    # not an image, skipped
//! └── 2024/                     └── 2024/
//!     ├── beach.png       ──►       ├── beach.png
//!     └── pier.webp       ──►       └── pier.webp
//! ```
//!
//! With a format override every output takes that extension instead.
//!
//! ## Failure Handling
//!
//! A failing image is reported and counted; it never aborts the rest of the
//! batch. Progress goes out as [`ProcessEvent`]s over an optional channel so
//! the CLI can print while workers run.

use crate::config::Config;
use crate::imaging::{
    FitRequest, Format, ImageBackend, Quality, ResizeError, Resizer, supported_input_extensions,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Resize failed: {0}")]
    Resize(#[from] ResizeError),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(
        "{} and {} would both write {}",
        .first.display(),
        .second.display(),
        .output.display()
    )]
    OutputCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

/// One source image and where its resized copy goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Everything a worker needs to resize one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSettings {
    pub request: FitRequest,
    /// Pick the fit from orientation, then crop (ignores `request.mode`).
    pub auto: bool,
    pub single_pass_auto: bool,
    pub quality: Quality,
}

impl ProcessSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request: config.resize.request(),
            auto: config.resize.mode.fit_mode().is_none(),
            single_pass_auto: config.auto.single_pass,
            quality: Quality::new(config.output.quality),
        }
    }
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Dimensions before and after one resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Processed {
    pub source: (u32, u32),
    pub output: (u32, u32),
}

/// Progress report for one job.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Resized {
        /// 1-based position in the job list.
        index: usize,
        input: PathBuf,
        output: PathBuf,
        source: (u32, u32),
        size: (u32, u32),
    },
    Failed {
        index: usize,
        input: PathBuf,
        error: String,
    },
}

/// Outcome of a whole batch.
#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Find every decodable image under `input_dir`.
///
/// Outputs mirror the relative layout under `output_dir`. With
/// `format_override`, each output's extension is replaced by the override's.
/// Jobs come back sorted by path. Two inputs that map to the same output
/// (`photo.jpg` and `photo.png` under an override) are an
/// [`OutputCollision`](ProcessError::OutputCollision); nothing is written.
pub fn collect_jobs(
    input_dir: &Path,
    output_dir: &Path,
    format_override: Option<Format>,
) -> Result<Vec<Job>, ProcessError> {
    let mut jobs = Vec::new();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                supported_input_extensions().any(|s| s.eq_ignore_ascii_case(ext))
            });
        if !supported {
            continue;
        }
        let Ok(relative) = path.strip_prefix(input_dir) else {
            continue;
        };
        let mut output = output_dir.join(relative);
        if let Some(format) = format_override {
            output.set_extension(format.extension());
        }
        if let Some(first) = claimed.insert(output.clone(), path.to_path_buf()) {
            return Err(ProcessError::OutputCollision {
                output,
                first,
                second: path.to_path_buf(),
            });
        }
        jobs.push(Job {
            input: path.to_path_buf(),
            output,
        });
    }
    Ok(jobs)
}

/// Load, resize and save one image.
pub fn process_file<B: ImageBackend>(
    resizer: &Resizer<'_, B>,
    job: &Job,
    settings: &ProcessSettings,
) -> Result<Processed, ProcessError> {
    let source = resizer.load_path(&job.input)?;
    let canvas = if settings.auto {
        resizer.auto_resize(&source, &settings.request)?
    } else {
        resizer.resize(&source, &settings.request)?
    };
    let processed = Processed {
        source: source.dimensions(),
        output: canvas.dimensions(),
    };
    drop(source);

    if let Some(parent) = job.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    resizer.save_path(canvas, &job.output, settings.quality)?;
    Ok(processed)
}

/// Run every job in parallel on the global rayon pool.
///
/// Sends one [`ProcessEvent`] per job when `events` is given. The channel is
/// dropped on return, which ends any receiver loop.
pub fn process_batch<B: ImageBackend>(
    backend: &B,
    jobs: &[Job],
    settings: &ProcessSettings,
    events: Option<Sender<ProcessEvent>>,
) -> BatchSummary {
    let resizer = Resizer::new(backend).single_pass_auto(settings.single_pass_auto);
    log::info!("processing {} images", jobs.len());

    let results: Vec<(usize, Result<Processed, ProcessError>)> = jobs
        .par_iter()
        .enumerate()
        .map(|(i, job)| {
            let index = i + 1;
            let result = process_file(&resizer, job, settings);
            let event = match &result {
                Ok(processed) => {
                    log::info!(
                        "{} -> {} ({}x{})",
                        job.input.display(),
                        job.output.display(),
                        processed.output.0,
                        processed.output.1
                    );
                    ProcessEvent::Resized {
                        index,
                        input: job.input.clone(),
                        output: job.output.clone(),
                        source: processed.source,
                        size: processed.output,
                    }
                }
                Err(err) => {
                    log::warn!("{}: {err}", job.input.display());
                    ProcessEvent::Failed {
                        index,
                        input: job.input.clone(),
                        error: err.to_string(),
                    }
                }
            };
            if let Some(tx) = &events {
                // A receiver that hung up only loses progress lines.
                tx.send(event).ok();
            }
            (i, result)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (i, result) in results {
        match result {
            Ok(_) => summary.succeeded += 1,
            Err(err) => summary.failed.push((jobs[i].input.clone(), err.to_string())),
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResizeMode;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use std::fs;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"fake image bytes").unwrap();
    }

    fn mock_with(count: usize, width: u32, height: u32) -> MockBackend {
        MockBackend::with_dimensions(vec![Dimensions { width, height }; count])
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[test]
    fn settings_from_default_config() {
        let settings = ProcessSettings::default();
        assert_eq!(settings.request, FitRequest::crop(200, 200));
        assert!(!settings.auto);
        assert!(!settings.single_pass_auto);
        assert_eq!(settings.quality, Quality::new(100));
    }

    #[test]
    fn settings_auto_mode() {
        let mut config = Config::default();
        config.resize.mode = ResizeMode::Auto;
        config.auto.single_pass = true;
        config.output.quality = 75;
        let settings = ProcessSettings::from_config(&config);
        assert!(settings.auto);
        assert!(settings.single_pass_auto);
        assert_eq!(settings.quality.value(), 75);
    }

    // =========================================================================
    // collect_jobs
    // =========================================================================

    #[test]
    fn collect_jobs_mirrors_tree_and_skips_non_images() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        touch(&input.join("b.png"));
        touch(&input.join("a.JPG"));
        touch(&input.join("notes.txt"));
        touch(&input.join("2024/pier.webp"));

        let jobs = collect_jobs(&input, &output, None).unwrap();
        let outputs: Vec<_> = jobs.iter().map(|j| j.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                output.join("2024/pier.webp"),
                output.join("a.JPG"),
                output.join("b.png"),
            ]
        );
        assert_eq!(jobs[1].input, input.join("a.JPG"));
    }

    #[test]
    fn collect_jobs_skips_avif_inputs() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("in/photo.avif"));
        let jobs = collect_jobs(&tmp.path().join("in"), &tmp.path().join("out"), None).unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn collect_jobs_applies_format_override() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        touch(&input.join("cover.jpg"));

        let jobs = collect_jobs(&input, &tmp.path().join("out"), Some(Format::WebP)).unwrap();
        assert_eq!(jobs[0].output, tmp.path().join("out/cover.webp"));
    }

    #[test]
    fn collect_jobs_override_collision_is_error() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        touch(&input.join("photo.jpg"));
        touch(&input.join("photo.png"));

        let result = collect_jobs(&input, &output, Some(Format::WebP));
        match result {
            Err(ProcessError::OutputCollision {
                output: target,
                first,
                second,
            }) => {
                assert_eq!(target, output.join("photo.webp"));
                assert_eq!(first, input.join("photo.jpg"));
                assert_eq!(second, input.join("photo.png"));
            }
            other => panic!("expected collision, got {other:?}"),
        }
        assert!(!output.exists());
    }

    #[test]
    fn collect_jobs_same_stem_without_override_is_fine() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        touch(&input.join("photo.jpg"));
        touch(&input.join("photo.png"));

        let jobs = collect_jobs(&input, &tmp.path().join("out"), None).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_ne!(jobs[0].output, jobs[1].output);
    }

    #[test]
    fn collect_jobs_missing_dir_is_walk_error() {
        let tmp = TempDir::new().unwrap();
        let result = collect_jobs(&tmp.path().join("nope"), tmp.path(), None);
        assert!(matches!(result, Err(ProcessError::Walk(_))));
    }

    // =========================================================================
    // process_file / process_batch (mock backend)
    // =========================================================================

    #[test]
    fn process_file_crops_and_writes() {
        let tmp = TempDir::new().unwrap();
        let job = Job {
            input: tmp.path().join("wide.jpg"),
            output: tmp.path().join("out/nested/wide.png"),
        };
        touch(&job.input);
        let backend = mock_with(1, 800, 600);
        let resizer = Resizer::new(&backend);

        let processed = process_file(&resizer, &job, &ProcessSettings::default()).unwrap();
        assert_eq!(processed.source, (800, 600));
        assert_eq!(processed.output, (200, 200));
        // Mock encode writes the extension as the payload
        assert_eq!(fs::read(&job.output).unwrap(), b"png");

        let ops = backend.get_operations();
        assert!(ops.contains(&RecordedOp::Decode(Format::Jpeg)));
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Encode {
                format: Format::Png,
                width: 200,
                height: 200,
                ..
            })
        ));
    }

    #[test]
    fn process_file_auto_runs_both_passes() {
        let tmp = TempDir::new().unwrap();
        let job = Job {
            input: tmp.path().join("tall.png"),
            output: tmp.path().join("tall-out.png"),
        };
        touch(&job.input);
        let backend = mock_with(1, 400, 800);
        let resizer = Resizer::new(&backend);
        let settings = ProcessSettings {
            auto: true,
            request: FitRequest::crop(100, 100),
            ..ProcessSettings::default()
        };

        let processed = process_file(&resizer, &job, &settings).unwrap();
        assert_eq!(processed.output, (100, 100));
        assert_eq!(backend.resamples().len(), 3);
    }

    #[test]
    fn process_batch_reports_every_job() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("in");
        let output = tmp.path().join("out");
        for name in ["a.jpg", "b.png", "c/d.gif"] {
            touch(&input.join(name));
        }
        let jobs = collect_jobs(&input, &output, None).unwrap();
        let backend = mock_with(jobs.len(), 640, 480);

        let (tx, rx) = mpsc::channel();
        let summary = process_batch(&backend, &jobs, &ProcessSettings::default(), Some(tx));
        let events: Vec<ProcessEvent> = rx.iter().collect();

        assert_eq!(summary.succeeded, 3);
        assert!(summary.is_success());
        assert_eq!(events.len(), 3);
        assert!(
            events
                .iter()
                .all(|e| matches!(e, ProcessEvent::Resized { size: (200, 200), .. }))
        );
        assert!(output.join("c/d.gif").exists());
    }

    #[test]
    fn process_batch_failure_does_not_abort_others() {
        let tmp = TempDir::new().unwrap();
        let good = Job {
            input: tmp.path().join("good.jpg"),
            output: tmp.path().join("out/good.jpg"),
        };
        touch(&good.input);
        let missing = Job {
            input: tmp.path().join("missing.jpg"),
            output: tmp.path().join("out/missing.jpg"),
        };
        let backend = mock_with(1, 300, 300);

        let summary = process_batch(
            &backend,
            &[good.clone(), missing.clone()],
            &ProcessSettings::default(),
            None,
        );
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, missing.input);
        assert_eq!(summary.total(), 2);
        assert!(good.output.exists());
    }

    #[test]
    fn process_batch_unsupported_output_is_reported() {
        let tmp = TempDir::new().unwrap();
        let job = Job {
            input: tmp.path().join("a.png"),
            output: tmp.path().join("a.bmp"),
        };
        touch(&job.input);
        let backend = mock_with(1, 300, 300);

        let (tx, rx) = mpsc::channel();
        let summary = process_batch(&backend, &[job], &ProcessSettings::default(), Some(tx));
        assert!(!summary.is_success());
        match rx.recv().unwrap() {
            ProcessEvent::Failed { index, error, .. } => {
                assert_eq!(index, 1);
                assert!(error.contains("Unsupported image format"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn process_batch_empty_job_list() {
        let backend = MockBackend::new();
        let summary = process_batch(&backend, &[], &ProcessSettings::default(), None);
        assert_eq!(summary, BatchSummary::default());
    }
}
