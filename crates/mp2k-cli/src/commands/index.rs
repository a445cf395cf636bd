//! Index command implementation
//!
//! Builds the voicegroup index for a sound directory, optionally writes it as
//! JSON, and remembers the directory on success.

use anyhow::{Context, Result};
use colored::Colorize;
use mp2k_core::VoicegroupIndex;
use mp2k_voicegroup::IndexReport;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::{error_codes, warning_codes, JsonError, JsonOutput, JsonWarning};
use super::settings;

#[derive(Serialize)]
struct IndexResult<'a> {
    sound_dir: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
    group_count: usize,
    voice_count: usize,
    groups: &'a VoicegroupIndex,
}

/// Run the index command
///
/// # Arguments
/// * `sound_dir` - Sound directory (default: remembered directory)
/// * `output` - Optional JSON output path
/// * `no_save` - Do not remember the directory
/// * `json` - Output machine-readable JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    sound_dir: Option<&str>,
    output: Option<&str>,
    no_save: bool,
    json: bool,
) -> Result<ExitCode> {
    let Some(sound_dir) = settings::resolve_sound_dir(sound_dir) else {
        let message = "No sound directory given and none remembered; pass --sound-dir";
        if json {
            JsonOutput::<()>::failure(JsonError::new(error_codes::NO_SOUND_DIR, message)).print()?;
            return Ok(ExitCode::from(1));
        }
        anyhow::bail!(message);
    };
    let output = output.map(PathBuf::from);

    let report = match mp2k_voicegroup::index_with_report(&sound_dir) {
        Ok(report) => report,
        Err(e) if json => {
            JsonOutput::<()>::failure(JsonError::from_failure(&e)).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to index {}", sound_dir.display()));
        }
    };

    if let Some(path) = &output {
        mp2k_voicegroup::write_json(&report.index, path)
            .with_context(|| format!("Failed to write index to {}", path.display()))?;
    }

    let mut warnings = collect_warnings(&report);
    if !no_save {
        if let Err(e) = settings::remember_sound_dir(&sound_dir) {
            warnings.push(JsonWarning::new(
                warning_codes::SETTINGS_NOT_SAVED,
                format!("{:#}", e),
            ));
        }
    }

    if json {
        JsonOutput::success(
            IndexResult {
                sound_dir: &sound_dir,
                output: output.as_deref(),
                group_count: report.index.len(),
                voice_count: report.index.total_voices(),
                groups: &report.index,
            },
            warnings,
        )
        .print()?;
        return Ok(ExitCode::SUCCESS);
    }

    print_report(&sound_dir, &report, output.as_deref(), &warnings);
    Ok(ExitCode::SUCCESS)
}

fn collect_warnings(report: &IndexReport) -> Vec<JsonWarning> {
    let missing = report.missing_includes.iter().map(|path| {
        JsonWarning::new(
            warning_codes::MISSING_INCLUDE,
            format!("included file not found: {}", path.display()),
        )
    });
    let duplicates = report.duplicates.iter().map(|dup| {
        JsonWarning::new(
            warning_codes::DUPLICATE_GROUP,
            format!(
                "voice group '{}' in {} ignored; first definition wins",
                dup.name,
                dup.source_file.display()
            ),
        )
    });
    missing.chain(duplicates).collect()
}

fn print_report(
    sound_dir: &Path,
    report: &IndexReport,
    output: Option<&Path>,
    warnings: &[JsonWarning],
) {
    println!("{} {}", "Indexing:".cyan().bold(), sound_dir.display());
    println!(
        "  {} {} files, {} voice groups, {} voices",
        "->".green(),
        report.files.len(),
        report.index.len(),
        report.index.total_voices()
    );
    println!();

    let width = report.index.names().map(str::len).max().unwrap_or(0);
    for group in &report.index {
        println!(
            "  {:<width$}  {:>3} voices",
            group.name(),
            group.len(),
            width = width
        );
    }

    if !warnings.is_empty() {
        println!();
        for warning in warnings {
            println!("  {} {}", "!!".yellow(), warning.message);
        }
    }

    if let Some(path) = output {
        println!();
        println!("{} index written to {}", "ok".green(), path.display());
    }
}
