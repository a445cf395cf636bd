//! Preview command implementation
//!
//! Stages a MIDI into the game repository, builds the ROM, and launches the
//! emulator, printing each pipeline stage as it starts.

use anyhow::Result;
use colored::Colorize;
use mp2k_core::{PipelineResult, PreviewRequest, Stage};
use mp2k_preview::{Orchestrator, OrchestratorConfig, PipelineReport};
use std::process::ExitCode;

use super::json_output::{error_codes, JsonError, JsonOutput};
use super::mapping::{build_plan, MapArg};

/// Everything the preview command takes from the command line.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub repo: String,
    pub midi: String,
    pub voicegroup: String,
    pub volume: u8,
    pub reverb: u8,
    pub priority: u8,
    pub emulator: String,
    pub map: Vec<MapArg>,
    pub default_voice: Option<i32>,
    pub first_only: bool,
    pub make: String,
    pub build_args: Vec<String>,
    pub no_clean: bool,
}

impl PreviewOptions {
    /// The orchestrator config these options describe.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .build_program(&self.make)
            .build_args(self.build_args.iter().cloned())
            .clean_first(!self.no_clean)
    }

    /// The preview request these options describe.
    pub fn request(&self) -> Result<PreviewRequest> {
        let mut request =
            PreviewRequest::new(&self.repo, &self.midi, &self.voicegroup, &self.emulator)
                .volume(self.volume)
                .reverb(self.reverb)
                .priority(self.priority);
        if let Some(plan) = build_plan(&self.map, self.default_voice, self.first_only)? {
            request = request.rewrite(plan);
        }
        Ok(request)
    }
}

/// Run the preview command
///
/// # Returns
/// Exit code: 0 when the emulator was started, 1 otherwise
pub fn run(options: &PreviewOptions, json: bool) -> Result<ExitCode> {
    let request = match options.request() {
        Ok(request) => request,
        Err(e) if json => {
            let error = JsonError::new(error_codes::INVALID_ARGUMENT, format!("{:#}", e));
            JsonOutput::<()>::failure(error).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    };
    let orchestrator = Orchestrator::with_config(options.orchestrator_config());

    if json {
        let report = orchestrator.run(&request);
        return print_json(report);
    }

    println!("{} {}", "Preview:".cyan().bold(), options.midi);
    println!(
        "  {} voicegroup {}, volume {}, reverb {}, priority {}",
        "->".green(),
        request.voicegroup_name,
        request.volume,
        request.reverb,
        request.priority
    );
    println!();

    let report = orchestrator.run_with_observer(&request, |stage| {
        if stage != Stage::Done {
            println!("  {} {}", "..".dimmed(), stage_label(stage));
        }
    });
    print_report(&report)
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "idle",
        Stage::Validating => "validating MIDI",
        Stage::Staging => "staging into preview slot",
        Stage::ConfigWriting => "writing midi.cfg",
        Stage::Building => "building ROM",
        Stage::ArtifactCheck => "checking ROM",
        Stage::Launching => "launching emulator",
        Stage::Done => "done",
    }
}

fn print_report(report: &PipelineReport) -> Result<ExitCode> {
    println!();
    if let Some(summary) = &report.rewrite {
        println!(
            "  {} {} program changes rewritten",
            "->".green(),
            summary.rewritten
        );
    }

    match &report.result {
        PipelineResult::Success { rom_path } => {
            println!(
                "{} emulator started on {} ({} ms)",
                "SUCCESS".green().bold(),
                rom_path.display(),
                report.total_ms()
            );
            Ok(ExitCode::SUCCESS)
        }
        PipelineResult::Failed {
            stage,
            error_kind,
            detail,
        } => {
            println!(
                "{} {} failed ({})",
                "FAILED".red().bold(),
                stage,
                error_kind
            );
            for line in detail.lines() {
                println!("  {}", line.dimmed());
            }
            if let Some(staged) = &report.staged_midi {
                println!(
                    "  {} staged MIDI left at {}",
                    "->".yellow(),
                    staged.display()
                );
            }
            Ok(ExitCode::from(1))
        }
    }
}

fn print_json(report: PipelineReport) -> Result<ExitCode> {
    let code = if report.result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };
    let output = JsonOutput {
        success: report.result.is_success(),
        errors: Vec::new(),
        warnings: Vec::new(),
        result: Some(report),
    };
    output.print()?;
    Ok(code)
}
