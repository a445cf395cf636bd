//! Doctor command implementation
//!
//! Checks that the tools and directories a preview needs are in place.

use anyhow::Result;
use colored::Colorize;
use mp2k_preview::{resolve_program, validate_sound_dir, Settings};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::JsonOutput;
use super::settings;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct ToolCheck {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct SoundDirCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    has_manifest: bool,
}

#[derive(Debug, Clone, Serialize)]
struct DoctorReport {
    version: &'static str,
    build_tool: ToolCheck,
    emulator: ToolCheck,
    sound_dir: SoundDirCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings_path: Option<PathBuf>,
}

impl DoctorReport {
    fn all_ok(&self) -> bool {
        self.build_tool.resolved.is_some() && self.emulator.resolved.is_some()
    }
}

fn check_tool(name: &str) -> ToolCheck {
    ToolCheck {
        name: name.to_string(),
        resolved: resolve_program(Path::new(name)),
    }
}

/// Run the doctor command
///
/// Checks:
/// - Build tool on PATH
/// - Emulator on PATH
/// - Sound directory holds voice_groups.inc (informational)
///
/// # Returns
/// Exit code: 0 if the build tool and emulator resolve, 1 otherwise
pub fn run(emulator: &str, make: &str, sound_dir: Option<&str>, json: bool) -> Result<ExitCode> {
    let settings_path = Settings::default_path().ok();
    let sound_dir = match sound_dir {
        Some(dir) => Some(PathBuf::from(dir)),
        None => settings::load_or_default().sound_dir,
    };
    let report = DoctorReport {
        version: env!("CARGO_PKG_VERSION"),
        build_tool: check_tool(make),
        emulator: check_tool(emulator),
        sound_dir: SoundDirCheck {
            has_manifest: sound_dir.as_deref().is_some_and(validate_sound_dir),
            path: sound_dir,
        },
        settings_path,
    };
    let code = if report.all_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    if json {
        let all_ok = report.all_ok();
        let mut output = JsonOutput::success(report, Vec::new());
        output.success = all_ok;
        output.print()?;
        return Ok(code);
    }

    println!("{}", "mp2k Doctor".cyan().bold());
    println!("{}", "===========".cyan());
    println!();

    println!("{}", "Versions:".bold());
    println!("  {} mp2k-cli v{}", "->".green(), report.version);
    println!();

    println!("{}", "Tools:".bold());
    print_tool("build tool", &report.build_tool);
    print_tool("emulator", &report.emulator);
    println!();

    println!("{}", "Sound directory:".bold());
    match &report.sound_dir.path {
        Some(path) if report.sound_dir.has_manifest => {
            println!("  {} {} (voice_groups.inc found)", "ok".green(), path.display());
        }
        Some(path) => {
            println!(
                "  {} {} has no voice_groups.inc",
                "!!".yellow(),
                path.display()
            );
        }
        None => {
            println!("  {} not set", "!!".yellow());
            println!(
                "     {}",
                "Pass --sound-dir or run `mp2k settings set-sound-dir <dir>`.".dimmed()
            );
        }
    }
    if let Some(path) = &report.settings_path {
        println!("  {} settings file: {}", "->".dimmed(), path.display());
    }
    println!();

    if report.all_ok() {
        println!("{} All checks passed!", "SUCCESS".green().bold());
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
    }
    Ok(code)
}

fn print_tool(label: &str, check: &ToolCheck) {
    match &check.resolved {
        Some(path) => println!(
            "  {} {} '{}' ({})",
            "ok".green(),
            label,
            check.name,
            path.display()
        ),
        None => println!(
            "  {} {} '{}' not found on PATH",
            "!!".red(),
            label,
            check.name
        ),
    }
}
