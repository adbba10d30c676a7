//! Batch command implementation.

use super::output::{JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use mayhem::batch::{BatchStats, run_batch_with};
use mayhem::game::AGENT_COUNT;
use std::path::Path;
use std::time::Instant;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the template is rejected.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    runs: u64,
    seed: Option<u64>,
    frames: u64,
    speed: Option<u8>,
    config: Option<&Path>,
    threads: Option<usize>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let (config, base_seed) = load_config(config, seed, speed)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let pb = if progress {
        let pb = ProgressBar::new(runs);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let results = run_batch_with(base_seed, runs, frames, &config, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    let stats = BatchStats::from_runs(&results, AGENT_COUNT);

    #[allow(clippy::cast_precision_loss)]
    let runs_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.runs as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            println!("Base seed: {base_seed}, frames per run: {frames}");
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Duration: {:.2}s ({runs_per_sec:.0} runs/sec)", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
