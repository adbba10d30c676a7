//! Run command implementation.

use super::output::{FrameEvent, JsonRunResult, describe_event, format_text};
use super::{CliError, OutputFormat, load_config};
use mayhem::Simulation;
use std::path::Path;
use tracing::info;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the config is invalid.
pub(crate) fn execute(
    seed: Option<u64>,
    frames: u64,
    speed: Option<u8>,
    config: Option<&Path>,
    format: OutputFormat,
    events: bool,
) -> Result<(), CliError> {
    let (config, seed) = load_config(config, seed, speed)?;
    let mut sim = Simulation::new(seed, &config)?;
    info!(seed, frames, speed = config.speed.get(), "starting run");

    let mut log = events.then(Vec::new);
    for _ in 0..frames {
        let frame_events = sim.frame();
        if let Some(log) = log.as_mut() {
            let frame = sim.frame_count();
            log.extend(frame_events.into_iter().map(|event| FrameEvent { frame, event }));
        }
    }

    match format {
        OutputFormat::Text => {
            if let Some(log) = &log {
                for entry in log {
                    println!("[frame {:>5}] {}", entry.frame, describe_event(&entry.event));
                }
                println!();
            }
            print!("{}", format_text(&sim));
        }
        OutputFormat::Json => {
            let json_result = JsonRunResult::from_simulation(&sim, log);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
