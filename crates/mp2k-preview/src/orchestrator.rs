//! Preview build pipeline.
//!
//! One run walks `Validating → Staging → ConfigWriting → Building →
//! ArtifactCheck → Launching → Done` strictly in order and stops at the first
//! failing stage. Nothing is retried or cleaned up after a failure; the staged
//! MIDI and the rewritten config stay on disk for inspection.
//!
//! The orchestrator holds no lock on the repository. Callers must not run two
//! previews against the same repository root at the same time, because both
//! builds would share one set of on-disk artifacts.

use mp2k_core::{PipelineResult, PreviewFailure, PreviewRequest, Stage, StageTiming};
use mp2k_midi::RewriteSummary;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config;
use crate::error::{PipelineError, PipelineStageResult};
use crate::toolchain::{SystemToolchain, Toolchain};
use crate::{
    DEFAULT_ARTIFACT_PATH, DEFAULT_BUILD_PROGRAM, DEFAULT_CONFIG_PATH, DEFAULT_PREVIEW_SLOT,
};

/// Configuration for the preview orchestrator.
///
/// Paths are relative to the request's repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Build tool; an existing path or a name looked up on `PATH`.
    pub build_program: PathBuf,
    /// Arguments for the build step.
    pub build_args: Vec<String>,
    /// Run `<build_program> clean` before building.
    pub clean_first: bool,
    /// Where the MIDI is staged.
    pub preview_slot: PathBuf,
    /// The `midi.cfg` holding the preview line.
    pub config_path: PathBuf,
    /// ROM the build produces.
    pub artifact_path: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            build_program: PathBuf::from(DEFAULT_BUILD_PROGRAM),
            build_args: vec!["-j1".to_string()],
            clean_first: true,
            preview_slot: PathBuf::from(DEFAULT_PREVIEW_SLOT),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        }
    }
}

impl OrchestratorConfig {
    /// Sets the build tool.
    pub fn build_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.build_program = program.into();
        self
    }

    /// Replaces the build arguments.
    pub fn build_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn clean_first(mut self, clean_first: bool) -> Self {
        self.clean_first = clean_first;
        self
    }

    pub fn preview_slot(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_slot = path.into();
        self
    }

    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    pub fn artifact_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact_path = path.into();
        self
    }

    /// A [`SystemToolchain`] running this config's build command.
    pub fn system_toolchain(&self) -> SystemToolchain {
        SystemToolchain::new(
            self.build_program.clone(),
            self.build_args.clone(),
            self.clean_first,
        )
    }
}

/// Outcome of one run plus what happened along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub result: PipelineResult,
    /// One entry per stage that started, in order.
    pub timings: Vec<StageTiming>,
    /// Where the MIDI was staged, if staging succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_midi: Option<PathBuf>,
    /// Rewrite counts, if the request carried a rewrite plan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewriteSummary>,
}

impl PipelineReport {
    /// Total time across all recorded stages.
    pub fn total_ms(&self) -> u64 {
        self.timings.iter().map(|t| t.duration_ms).sum()
    }
}

/// The preview build orchestrator.
pub struct Orchestrator<T: Toolchain = SystemToolchain> {
    config: OrchestratorConfig,
    toolchain: T,
}

impl Orchestrator<SystemToolchain> {
    /// Creates an orchestrator with default configuration.
    pub fn new() -> Self {
        Self::with_config(OrchestratorConfig::default())
    }

    /// Creates an orchestrator that builds with the configured system tools.
    pub fn with_config(config: OrchestratorConfig) -> Self {
        let toolchain = config.system_toolchain();
        Self { config, toolchain }
    }
}

impl Default for Orchestrator<SystemToolchain> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Toolchain> Orchestrator<T> {
    /// Creates an orchestrator with a custom toolchain.
    pub fn with_toolchain(config: OrchestratorConfig, toolchain: T) -> Self {
        Self { config, toolchain }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Runs the whole pipeline for `request`.
    pub fn run(&self, request: &PreviewRequest) -> PipelineReport {
        self.run_with_observer(request, |_| {})
    }

    /// Like [`run`](Self::run), calling `observer` as each stage is entered
    /// (including `Done` on success).
    pub fn run_with_observer<F>(&self, request: &PreviewRequest, mut observer: F) -> PipelineReport
    where
        F: FnMut(Stage),
    {
        let mut progress = Progress::default();
        let result = match self.drive(request, &mut progress, &mut observer) {
            Ok(rom_path) => {
                observer(Stage::Done);
                PipelineResult::Success { rom_path }
            }
            Err(err) => PipelineResult::failed(err.stage(), err.kind(), err.to_string()),
        };
        PipelineReport {
            result,
            timings: progress.timings,
            staged_midi: progress.staged_midi,
            rewrite: progress.rewrite,
        }
    }

    fn drive(
        &self,
        request: &PreviewRequest,
        progress: &mut Progress,
        observer: &mut dyn FnMut(Stage),
    ) -> PipelineStageResult<PathBuf> {
        let mut timer = StageTimer {
            timings: &mut progress.timings,
            observer,
        };

        timer.time(Stage::Validating, || {
            mp2k_midi::validate(&request.source_midi).map_err(PipelineError::Validation)
        })?;

        let (staged, rewrite) = timer.time(Stage::Staging, || self.stage_midi(request))?;
        progress.staged_midi = Some(staged);
        progress.rewrite = rewrite;

        timer.time(Stage::ConfigWriting, || {
            config::update(
                &request.repo_root.join(&self.config.config_path),
                &request.voicegroup_name,
                request.volume,
                request.reverb,
                request.priority,
            )
            .map(|_| ())
            .map_err(PipelineError::from)
        })?;

        timer.time(Stage::Building, || self.toolchain.build(&request.repo_root))?;

        let rom = request.repo_root.join(&self.config.artifact_path);
        timer.time(Stage::ArtifactCheck, || {
            if rom.is_file() {
                Ok(())
            } else {
                Err(PipelineError::MissingArtifact { path: rom.clone() })
            }
        })?;

        timer.time(Stage::Launching, || {
            self.toolchain.launch(&request.emulator_path, &rom)
        })?;

        Ok(rom)
    }

    fn stage_midi(
        &self,
        request: &PreviewRequest,
    ) -> PipelineStageResult<(PathBuf, Option<RewriteSummary>)> {
        if !request.repo_root.is_dir() {
            return Err(PipelineError::RepoNotFound {
                path: request.repo_root.clone(),
            });
        }

        let bytes = std::fs::read(&request.source_midi).map_err(|source| {
            PipelineError::Staging {
                path: request.source_midi.clone(),
                source,
            }
        })?;

        let (bytes, summary) = match &request.rewrite {
            Some(plan) => {
                let (bytes, summary) =
                    mp2k_midi::rewrite_with_summary(&bytes, &plan.map, plan.mode)
                        .map_err(PipelineError::Rewrite)?;
                (bytes, Some(summary))
            }
            None => (bytes, None),
        };

        let dest = request.repo_root.join(&self.config.preview_slot);
        write_creating_parents(&dest, &bytes).map_err(|source| PipelineError::Staging {
            path: dest.clone(),
            source,
        })?;
        Ok((dest, summary))
    }
}

fn write_creating_parents(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

#[derive(Default)]
struct Progress {
    timings: Vec<StageTiming>,
    staged_midi: Option<PathBuf>,
    rewrite: Option<RewriteSummary>,
}

struct StageTimer<'a, F: FnMut(Stage)> {
    timings: &'a mut Vec<StageTiming>,
    observer: F,
}

impl<F: FnMut(Stage)> StageTimer<'_, F> {
    fn time<R>(
        &mut self,
        stage: Stage,
        f: impl FnOnce() -> PipelineStageResult<R>,
    ) -> PipelineStageResult<R> {
        (self.observer)(stage);
        let start = Instant::now();
        let result = f();
        self.timings
            .push(StageTiming::new(stage, start.elapsed().as_millis() as u64));
        result
    }
}
