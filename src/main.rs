use clap::{Parser, Subcommand};
use photoprep::imaging::RustCodec;
use photoprep::{config, output, prepare, scan};
use std::path::PathBuf;

/// Shared flags for commands that read inputs.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image files or directories to prepare
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

/// Policy overrides shared by prepare and check. Each one beats the
/// corresponding `photoprep.toml` value.
#[derive(clap::Args, Clone)]
struct PolicyArgs {
    /// Skip inputs below this many KiB
    #[arg(long)]
    threshold_kib: Option<u64>,

    /// Cap on the longer pixel edge
    #[arg(long)]
    max_dimension: Option<u32>,

    /// JPEG quality (1-100)
    #[arg(long)]
    quality: Option<u8>,
}

#[derive(Parser)]
#[command(name = "photoprep")]
#[command(version)]
#[command(about = "Prepare product photos for upload")]
#[command(long_about = "\
Prepare product photos for upload

Normalizes a batch of images so they are safe and efficient to upload:
the longer edge is capped (default 1920px), photos are re-encoded as
JPEG at high quality, PNGs keep their format so transparency survives,
and a result that isn't strictly smaller than the input is discarded in
favor of the original. Small files and non-images pass through untouched.

Inputs:
  Files are taken as given, whatever their type. Directories are walked
  recursively and contribute files with image extensions (jpg, jpeg, png,
  tif, tiff, webp).

Output:
  One file per input in the output directory, named after its source,
  plus manifest.json describing what was done to each file. A skip cache
  (.prep-cache.json) makes re-runs cheap; --no-cache bypasses it.

Run 'photoprep gen-config' to generate a documented photoprep.toml.")]
struct Cli {
    /// Config file (defaults to photoprep.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize inputs into the output directory
    Prepare {
        #[command(flatten)]
        input_args: InputArgs,

        /// Output directory for prepared files
        #[arg(long, default_value = "prepared")]
        output: PathBuf,

        /// Disable the skip cache and re-encode every file
        #[arg(long)]
        no_cache: bool,

        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Report what prepare would do, without writing anything
    Check {
        #[command(flatten)]
        input_args: InputArgs,

        #[command(flatten)]
        policy: PolicyArgs,
    },
    /// Print a stock photoprep.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Prepare {
            input_args,
            output,
            no_cache,
            policy,
        } => {
            let prep_config = load_config(cli.config.as_deref(), &policy)?;
            init_thread_pool(&prep_config.processing);
            let normalize_config = prep_config.normalize_config();

            let candidates = scan::scan(&input_args.inputs)?;
            let codec = RustCodec::new();

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_prepare_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let report = prepare::prepare(
                &codec,
                &candidates,
                &output,
                &normalize_config,
                !no_cache,
                Some(tx),
            )?;
            printer.join().unwrap();

            println!();
            output::print_summary(&report);
        }
        Command::Check { input_args, policy } => {
            let prep_config = load_config(cli.config.as_deref(), &policy)?;
            let normalize_config = prep_config.normalize_config();

            let candidates = scan::scan(&input_args.inputs)?;
            let codec = RustCodec::new();
            let entries = prepare::check(&codec, &candidates, &normalize_config)?;
            output::print_check_output(&entries);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config and fold in command-line policy overrides.
fn load_config(
    path: Option<&std::path::Path>,
    policy: &PolicyArgs,
) -> Result<config::PrepConfig, config::ConfigError> {
    let mut prep_config = config::PrepConfig::load(path)?;
    if let Some(threshold_kib) = policy.threshold_kib {
        prep_config.normalize.threshold_kib = threshold_kib;
    }
    if let Some(max_dimension) = policy.max_dimension {
        prep_config.normalize.max_dimension = max_dimension;
    }
    if let Some(quality) = policy.quality {
        prep_config.normalize.quality = quality;
    }
    prep_config.validate()?;
    Ok(prep_config)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingSection) {
    let workers = config::effective_workers(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .ok();
}
