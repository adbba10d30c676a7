//! Mayhem CLI - run, watch and batch the snake arena.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Mayhem - a deterministic multi-agent snake arena
#[derive(Parser, Debug)]
#[command(name = "mayhem")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single headless match and print the result
    Run {
        /// Random seed (default: config file, then clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Frames to simulate
        #[arg(short, long, default_value = "500")]
        frames: u64,

        /// Ticks per frame (1-10)
        #[arg(long)]
        speed: Option<u8>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: cli::OutputFormat,

        /// Include every event in the output
        #[arg(short, long)]
        events: bool,
    },

    /// Interactive TUI to watch a match in real time
    Watch {
        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Ticks per frame (1-10), adjustable with +/-
        #[arg(long)]
        speed: Option<u8>,

        /// Frames per second
        #[arg(long, default_value = "10")]
        fps: u32,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run many matches in parallel and aggregate statistics
    Batch {
        /// Number of runs
        #[arg(short, long, default_value = "100")]
        runs: u64,

        /// Starting seed (increments for each run)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Frames per run
        #[arg(short, long, default_value = "500")]
        frames: u64,

        /// Ticks per frame (1-10)
        #[arg(long)]
        speed: Option<u8>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            seed,
            frames,
            speed,
            config,
            format,
            events,
        } => cli::run::execute(seed, frames, speed, config.as_deref(), format, events),

        Commands::Watch {
            seed,
            speed,
            fps,
            config,
        } => cli::watch::execute(seed, speed, fps, config.as_deref()),

        Commands::Batch {
            runs,
            seed,
            frames,
            speed,
            config,
            threads,
            format,
            progress,
        } => cli::batch::execute(
            runs,
            seed,
            frames,
            speed,
            config.as_deref(),
            threads,
            format,
            progress,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
