//! Error types for the preview pipeline.

use mp2k_core::{ErrorKind, PreviewFailure, RangeViolation, Stage};
use mp2k_midi::MidiError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for config writer operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline stages.
pub type PipelineStageResult<T> = Result<T, PipelineError>;

/// Errors raised while updating the build config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Volume, reverb, or priority is out of bounds. The file was not touched.
    #[error(transparent)]
    Range(#[from] RangeViolation),

    /// The config file could not be read (including when it does not exist).
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The updated config could not be written back.
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PreviewFailure for ConfigError {
    fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Range(_) => ErrorKind::RangeError,
            ConfigError::Read { .. } | ConfigError::Write { .. } => ErrorKind::IoError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ConfigError::Range(_) => "CONFIG_001",
            ConfigError::Read { .. } => "CONFIG_002",
            ConfigError::Write { .. } => "CONFIG_003",
        }
    }
}

/// A failure inside one pipeline stage.
///
/// Each variant belongs to exactly one [`Stage`]; the orchestrator turns it
/// into a `PipelineResult::Failed` tagged with that stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source MIDI is missing or is not a MIDI container.
    #[error("{0}")]
    Validation(#[source] MidiError),

    /// The repository root is not a directory.
    #[error("repository root not found: {path}")]
    RepoNotFound { path: PathBuf },

    /// Reading the source or writing the preview slot failed.
    #[error("failed to stage {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The channel rewrite rejected the map or the file.
    #[error("channel rewrite failed: {0}")]
    Rewrite(#[source] MidiError),

    /// The config line could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The build tool could not be started.
    #[error("failed to start build tool '{program}': {source}")]
    BuildSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The build tool exited unsuccessfully.
    #[error("`{command}` failed with {}{}", exit_label(.exit_code), stderr_suffix(.stderr))]
    BuildFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The build reported success but produced no ROM.
    #[error("build finished but the ROM is missing: {path}")]
    MissingArtifact { path: PathBuf },

    /// The emulator could not be resolved or started.
    #[error("failed to launch emulator '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}

impl PipelineError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Validation(_) => Stage::Validating,
            PipelineError::RepoNotFound { .. }
            | PipelineError::Staging { .. }
            | PipelineError::Rewrite(_) => Stage::Staging,
            PipelineError::Config(_) => Stage::ConfigWriting,
            PipelineError::BuildSpawn { .. } | PipelineError::BuildFailed { .. } => {
                Stage::Building
            }
            PipelineError::MissingArtifact { .. } => Stage::ArtifactCheck,
            PipelineError::Launch { .. } => Stage::Launching,
        }
    }
}

impl PreviewFailure for PipelineError {
    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(e) | PipelineError::Rewrite(e) => e.kind(),
            PipelineError::RepoNotFound { .. } | PipelineError::Staging { .. } => {
                ErrorKind::IoError
            }
            PipelineError::Config(e) => e.kind(),
            PipelineError::BuildSpawn { source, .. } | PipelineError::Launch { source, .. } => {
                ErrorKind::from_io(source)
            }
            PipelineError::BuildFailed { .. } => ErrorKind::BuildFailure,
            PipelineError::MissingArtifact { .. } => ErrorKind::MissingArtifact,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "PIPELINE_001",
            PipelineError::RepoNotFound { .. } => "PIPELINE_002",
            PipelineError::Staging { .. } => "PIPELINE_003",
            PipelineError::Rewrite(_) => "PIPELINE_004",
            PipelineError::Config(_) => "PIPELINE_005",
            PipelineError::BuildSpawn { .. } => "PIPELINE_006",
            PipelineError::BuildFailed { .. } => "PIPELINE_007",
            PipelineError::MissingArtifact { .. } => "PIPELINE_008",
            PipelineError::Launch { .. } => "PIPELINE_009",
        }
    }
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised while loading or saving user settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No per-user config directory exists on this platform.
    #[error("could not determine the user config directory")]
    NoConfigDir,

    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PreviewFailure for SettingsError {
    fn kind(&self) -> ErrorKind {
        match self {
            SettingsError::NoConfigDir => ErrorKind::NotFound,
            SettingsError::Read { source, .. } | SettingsError::Write { source, .. } => {
                ErrorKind::from_io(source)
            }
            SettingsError::Parse { .. } => ErrorKind::InvalidFormat,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            SettingsError::NoConfigDir => "SETTINGS_001",
            SettingsError::Read { .. } => "SETTINGS_002",
            SettingsError::Write { .. } => "SETTINGS_003",
            SettingsError::Parse { .. } => "SETTINGS_004",
        }
    }
}
