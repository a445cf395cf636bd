//! Settings command implementation
//!
//! Also resolves the sound directory for commands that accept `--sound-dir`.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use mp2k_preview::{validate_sound_dir, Settings};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::JsonOutput;

/// Settings file location, failing when the platform has no config dir.
pub fn settings_path() -> Result<PathBuf> {
    Settings::default_path().context("Failed to locate the settings file")
}

/// Loads settings, treating any problem as "nothing remembered".
pub fn load_or_default() -> Settings {
    Settings::default_path()
        .and_then(|path| Settings::load_from(&path))
        .unwrap_or_default()
}

/// Picks the sound directory: the argument if given, else the remembered one.
///
/// Returns `None` when neither is available.
pub fn resolve_sound_dir(arg: Option<&str>) -> Option<PathBuf> {
    match arg {
        Some(dir) => Some(PathBuf::from(dir)),
        None => load_or_default().valid_sound_dir().map(Path::to_path_buf),
    }
}

/// Remembers `dir` as the sound directory.
pub fn remember_sound_dir(dir: &Path) -> Result<PathBuf> {
    let path = settings_path()?;
    let mut settings = Settings::load_from(&path).unwrap_or_default();
    settings.sound_dir = Some(dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf()));
    settings
        .save_to(&path)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;
    Ok(path)
}

#[derive(Serialize)]
struct ShowResult {
    path: PathBuf,
    settings: Settings,
    sound_dir_valid: bool,
}

/// Run `settings show`
pub fn show(json: bool) -> Result<ExitCode> {
    let path = settings_path()?;
    let settings = Settings::load_from(&path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let sound_dir_valid = settings.valid_sound_dir().is_some();

    if json {
        JsonOutput::success(
            ShowResult {
                path,
                settings,
                sound_dir_valid,
            },
            Vec::new(),
        )
        .print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Settings:".cyan().bold(), path.display());
    match &settings.sound_dir {
        Some(dir) if sound_dir_valid => {
            println!("  {} sound_dir = {}", "ok".green(), dir.display());
        }
        Some(dir) => {
            println!(
                "  {} sound_dir = {} (no voice_groups.inc)",
                "!!".yellow(),
                dir.display()
            );
        }
        None => println!("  {} sound_dir is not set", "->".dimmed()),
    }
    Ok(ExitCode::SUCCESS)
}

/// Run `settings set-sound-dir`
pub fn set_sound_dir(dir: &str) -> Result<ExitCode> {
    let dir = Path::new(dir);
    if !validate_sound_dir(dir) {
        bail!("{} does not contain voice_groups.inc", dir.display());
    }
    let path = remember_sound_dir(dir)?;
    println!(
        "{} sound_dir saved to {}",
        "ok".green(),
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run `settings clear`
pub fn clear() -> Result<ExitCode> {
    let path = settings_path()?;
    Settings::default()
        .save_to(&path)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;
    println!("{} settings cleared ({})", "ok".green(), path.display());
    Ok(ExitCode::SUCCESS)
}
