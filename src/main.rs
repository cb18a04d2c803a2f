use clap::{Parser, Subcommand};
use simple_fit::config::{self, Config, ResizeMode};
use simple_fit::imaging::{Format, Resizer, RustBackend, plan_auto, plan_fit};
use simple_fit::{output, process};
use std::path::{Path, PathBuf};

/// Flags that override the `[resize]` and `[output]` config sections.
#[derive(clap::Args, Clone, Default)]
struct ResizeArgs {
    /// Fit strategy
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Encode quality, 0 (worst) to 100 (best)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum ModeArg {
    Exact,
    Portrait,
    Landscape,
    Crop,
    Auto,
}

impl From<ModeArg> for ResizeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Exact => ResizeMode::Exact,
            ModeArg::Portrait => ResizeMode::Portrait,
            ModeArg::Landscape => ResizeMode::Landscape,
            ModeArg::Crop => ResizeMode::Crop,
            ModeArg::Auto => ResizeMode::Auto,
        }
    }
}

impl ResizeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.resize.mode = mode.into();
        }
        if let Some(width) = self.width {
            config.resize.width = Some(width);
        }
        if let Some(height) = self.height {
            config.resize.height = Some(height);
        }
        if let Some(quality) = self.quality {
            config.output.quality = quality;
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("SIMPLE_FIT_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SIMPLE_FIT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-fit")]
#[command(about = "Aspect-aware image resizing and center cropping")]
#[command(long_about = "\
Aspect-aware image resizing and center cropping

Modes:
  exact      stretch to exactly WIDTHxHEIGHT
  portrait   fix the height, keep the aspect ratio
  landscape  fix the width, keep the aspect ratio
  crop       cover WIDTHxHEIGHT, then cut the centered target
  auto       choose landscape/portrait/exact by orientation, then crop

Formats are chosen by file extension: jpg, jpeg, png, gif, webp (read and
write) and avif (write only).

Settings come from simple-fit.toml in the current directory (or --config),
then command-line flags. Run 'simple-fit gen-config' for a documented file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./simple-fit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize a single image
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Print the resize geometry as JSON without touching pixels
    Plan {
        input: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
    },
    /// Resize every supported image under a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[command(flatten)]
        args: ResizeArgs,
        /// Re-encode every output to this format (jpg, png, gif, webp, avif)
        #[arg(long)]
        format: Option<String>,
    },
    /// Print a stock simple-fit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Resize {
            input,
            output,
            args,
        } => {
            let config = resolve(cli.config.as_deref(), &args)?;
            let backend = RustBackend::with_filter(config.resize.filter);
            let resizer = Resizer::new(&backend).single_pass_auto(config.auto.single_pass);
            let settings = process::ProcessSettings::from_config(&config);
            let job = process::Job {
                input: input.clone(),
                output: output.clone(),
            };
            let processed = process::process_file(&resizer, &job, &settings)?;
            output::print_resize_output(&input, &output, &processed);
        }
        Command::Plan { input, args } => {
            let config = resolve(cli.config.as_deref(), &args)?;
            let backend = RustBackend::new();
            let source = Resizer::new(&backend).identify_path(&input)?;
            let request = config.resize.request();
            let plans = match config.resize.mode {
                ResizeMode::Auto => plan_auto(source, &request, config.auto.single_pass)?,
                _ => vec![plan_fit(source, &request)?],
            };
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        Command::Batch {
            input_dir,
            output_dir,
            args,
            format,
        } => {
            let config = resolve(cli.config.as_deref(), &args)?;
            let format_override = match format {
                Some(ext) => Some(Format::from_extension(&ext)?),
                None => config.output.format,
            };
            init_thread_pool(&config.processing);

            let jobs = process::collect_jobs(&input_dir, &output_dir, format_override)?;
            let backend = RustBackend::with_filter(config.resize.filter);
            let settings = process::ProcessSettings::from_config(&config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = process::process_batch(&backend, &jobs, &settings, Some(tx));
            printer.join().ok();
            output::print_summary(&summary);

            if !summary.is_success() {
                return Err(format!("{} image(s) failed", summary.failed.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config from `--config` or the working directory, then apply flags.
fn resolve(path: Option<&Path>, args: &ResizeArgs) -> Result<Config, config::ConfigError> {
    let mut config = match path {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
