//! Rewrite command implementation
//!
//! Applies a channel-to-voice map to a MIDI file's program changes.

use anyhow::{Context, Result};
use colored::Colorize;
use mp2k_core::{RewriteMode, RewritePlan};
use mp2k_midi::{MidiError, RewriteSummary};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, warning_codes, JsonError, JsonOutput, JsonWarning};
use super::mapping::{build_plan, slots_past_end, MapArg};
use super::settings;

#[derive(Serialize)]
struct RewriteResult<'a> {
    input: &'a str,
    output: &'a str,
    mode: RewriteMode,
    #[serde(flatten)]
    summary: RewriteSummary,
}

/// Options for checking mapped slots against a voice group.
pub struct GroupCheck<'a> {
    pub voicegroup: &'a str,
    pub sound_dir: Option<&'a str>,
}

/// Run the rewrite command
///
/// # Arguments
/// * `input` - Source MIDI file
/// * `output` - Destination MIDI file
/// * `pairs` - `CHANNEL=VOICE` mappings
/// * `default_voice` - Voice for unmapped channels
/// * `first_only` - Only rewrite the first program change per channel
/// * `check` - Optional voice group to check mapped slots against
/// * `json` - Output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    input: &str,
    output: &str,
    pairs: &[MapArg],
    default_voice: Option<i32>,
    first_only: bool,
    check: Option<GroupCheck<'_>>,
    json: bool,
) -> Result<ExitCode> {
    let plan = match build_plan(pairs, default_voice, first_only) {
        Ok(plan) => plan.unwrap_or_default(),
        Err(e) if json => {
            let error = JsonError::new(error_codes::INVALID_ARGUMENT, format!("{:#}", e));
            JsonOutput::<()>::failure(error).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    };

    let warnings = match check {
        Some(check) => match group_warnings(&plan, &check) {
            Ok(warnings) => warnings,
            Err(error) if json => {
                JsonOutput::<()>::failure(error).print()?;
                return Ok(ExitCode::from(1));
            }
            Err(error) => anyhow::bail!(error.message),
        },
        None => Vec::new(),
    };

    let summary = match apply(input, output, &plan) {
        Ok(summary) => summary,
        Err(e) if json => {
            JsonOutput::<()>::failure(JsonError::from_failure(&e)).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to rewrite {}", input)),
    };

    if json {
        JsonOutput::success(
            RewriteResult {
                input,
                output,
                mode: plan.mode,
                summary,
            },
            warnings,
        )
        .print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {} -> {}", "Rewrite:".cyan().bold(), input, output);
    for warning in &warnings {
        println!("  {} {}", "!!".yellow(), warning.message);
    }
    println!(
        "  {} {} program changes rewritten, {} unchanged across {} tracks (mode: {})",
        "ok".green(),
        summary.rewritten,
        summary.passed_through,
        summary.tracks,
        plan.mode.as_str()
    );
    Ok(ExitCode::SUCCESS)
}

fn apply(input: &str, output: &str, plan: &RewritePlan) -> Result<RewriteSummary, MidiError> {
    let input = Path::new(input);
    mp2k_midi::validate(input)?;
    mp2k_midi::rewrite_file(input, Path::new(output), &plan.map, plan.mode)
}

fn group_warnings(
    plan: &RewritePlan,
    check: &GroupCheck<'_>,
) -> Result<Vec<JsonWarning>, JsonError> {
    let sound_dir = settings::resolve_sound_dir(check.sound_dir).ok_or_else(|| {
        JsonError::new(
            error_codes::NO_SOUND_DIR,
            "--voicegroup needs a sound directory; pass --sound-dir",
        )
    })?;
    let index = mp2k_voicegroup::index(&sound_dir).map_err(|e| JsonError::from_failure(&e))?;
    let group = index.get(check.voicegroup).ok_or_else(|| {
        JsonError::new(
            error_codes::UNKNOWN_VOICEGROUP,
            format!(
                "voice group '{}' not found in {}",
                check.voicegroup,
                sound_dir.display()
            ),
        )
    })?;

    Ok(slots_past_end(&plan.map, group)
        .into_iter()
        .map(|(channel, voice)| {
            let target = match channel {
                Some(channel) => format!("channel {}", channel),
                None => "default voice".to_string(),
            };
            JsonWarning::new(
                warning_codes::SLOT_PAST_END,
                format!(
                    "{} maps to slot {} but '{}' has {} voices",
                    target,
                    voice,
                    group.name(),
                    group.len()
                ),
            )
        })
        .collect())
}
