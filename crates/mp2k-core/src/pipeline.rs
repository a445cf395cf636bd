//! Pipeline stages and terminal outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

/// States of the preview build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Validating,
    Staging,
    ConfigWriting,
    Building,
    ArtifactCheck,
    Launching,
    Done,
}

impl Stage {
    /// All stages in order, `Idle` first.
    pub const ALL: [Stage; 8] = [
        Stage::Idle,
        Stage::Validating,
        Stage::Staging,
        Stage::ConfigWriting,
        Stage::Building,
        Stage::ArtifactCheck,
        Stage::Launching,
        Stage::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "Idle",
            Stage::Validating => "Validating",
            Stage::Staging => "Staging",
            Stage::ConfigWriting => "ConfigWriting",
            Stage::Building => "Building",
            Stage::ArtifactCheck => "ArtifactCheck",
            Stage::Launching => "Launching",
            Stage::Done => "Done",
        }
    }

    /// The stage that follows this one; `None` for `Done`.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Validating),
            Stage::Validating => Some(Stage::Staging),
            Stage::Staging => Some(Stage::ConfigWriting),
            Stage::ConfigWriting => Some(Stage::Building),
            Stage::Building => Some(Stage::ArtifactCheck),
            Stage::ArtifactCheck => Some(Stage::Launching),
            Stage::Launching => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineResult {
    /// The emulator was started against `rom_path`.
    Success { rom_path: PathBuf },
    /// The run stopped at `stage`.
    Failed {
        stage: Stage,
        error_kind: ErrorKind,
        detail: String,
    },
}

impl PipelineResult {
    pub fn failed(stage: Stage, error_kind: ErrorKind, detail: impl Into<String>) -> Self {
        PipelineResult::Failed {
            stage,
            error_kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success { .. })
    }

    pub fn rom_path(&self) -> Option<&Path> {
        match self {
            PipelineResult::Success { rom_path } => Some(rom_path),
            PipelineResult::Failed { .. } => None,
        }
    }

    /// The failing stage and kind, if the run failed.
    pub fn failure(&self) -> Option<(Stage, ErrorKind)> {
        match self {
            PipelineResult::Success { .. } => None,
            PipelineResult::Failed {
                stage, error_kind, ..
            } => Some((*stage, *error_kind)),
        }
    }
}

impl fmt::Display for PipelineResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineResult::Success { rom_path } => write!(f, "Done: {}", rom_path.display()),
            PipelineResult::Failed {
                stage,
                error_kind,
                detail,
            } => write!(f, "Failed at {} ({}): {}", stage, error_kind, detail),
        }
    }
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: Stage,
    /// Duration of this stage in milliseconds.
    pub duration_ms: u64,
}

impl StageTiming {
    pub fn new(stage: Stage, duration_ms: u64) -> Self {
        Self { stage, duration_ms }
    }
}
