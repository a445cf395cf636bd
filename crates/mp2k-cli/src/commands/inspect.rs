//! Inspect command implementation
//!
//! Prints which channels of a MIDI file carry notes or program changes.

use anyhow::{Context, Result};
use colored::Colorize;
use mp2k_midi::{MidiSummary, PERCUSSION_CHANNEL};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{JsonError, JsonOutput};

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(midi: &str, json: bool) -> Result<ExitCode> {
    let path = Path::new(midi);
    let summary = match mp2k_midi::inspect(path) {
        Ok(summary) => summary,
        Err(e) if json => {
            JsonOutput::<()>::failure(JsonError::from_failure(&e)).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to inspect {}", midi)),
    };

    if json {
        JsonOutput::success(summary, Vec::new()).print()?;
    } else {
        print_summary(midi, &summary);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(midi: &str, summary: &MidiSummary) {
    println!("{} {}", "Inspect:".cyan().bold(), midi);
    let timing = match summary.ticks_per_beat {
        Some(ticks) => format!("{} ticks/beat", ticks),
        None => "SMPTE timing".to_string(),
    };
    println!(
        "  {} format {}, {} tracks, {}",
        "->".green(),
        summary.format,
        summary.track_count,
        timing
    );
    println!();

    if summary.channels.is_empty() {
        println!("  {} no notes or program changes", "!!".yellow());
        return;
    }

    println!("{}", "Channels:".bold());
    for info in &summary.channels {
        let programs = if info.programs.is_empty() {
            "-".to_string()
        } else {
            info.programs
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let label = if info.channel == PERCUSSION_CHANNEL {
            format!("{:>2} (drums)", info.channel)
        } else {
            format!("{:>2}", info.channel)
        };
        println!(
            "  {:<10} notes: {:>5}  programs: {}",
            label, info.note_count, programs
        );
    }
}
