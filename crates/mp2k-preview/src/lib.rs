//! Preview build pipeline for mp2k songs.
//!
//! Stages a MIDI file into a decompiled game repository, points the preview
//! slot's `midi.cfg` line at the chosen voice group, builds the ROM and starts
//! an emulator on it.
//!
//! - [`config`] - `midi.cfg` preview line writer
//! - [`orchestrator`] - the stage-by-stage pipeline
//! - [`toolchain`] - build tool and emulator process boundary
//! - [`settings`] - remembered sound directory
//!
//! # Example
//!
//! ```no_run
//! use mp2k_core::PreviewRequest;
//! use mp2k_preview::Orchestrator;
//!
//! let request = PreviewRequest::new("pokeemerald", "song.mid", "route101", "mgba");
//! let report = Orchestrator::new().run(&request);
//! println!("{}", report.result);
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod settings;
pub mod toolchain;

pub use config::{ConfigEdit, PREVIEW_KEY};
pub use error::{
    ConfigError, ConfigResult, PipelineError, PipelineStageResult, SettingsError, SettingsResult,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, PipelineReport};
pub use settings::{validate_sound_dir, Settings};
pub use toolchain::{resolve_program, SystemToolchain, Toolchain};

/// Build tool used when none is configured.
pub const DEFAULT_BUILD_PROGRAM: &str = "make";
/// Emulator used when none is given.
pub const DEFAULT_EMULATOR: &str = "mgba";
/// Where the preview MIDI is staged, relative to the repository root.
pub const DEFAULT_PREVIEW_SLOT: &str = "sound/songs/midi/mus_preview.mid";
/// The song config, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = "sound/songs/midi/midi.cfg";
/// ROM produced by the build, relative to the repository root.
pub const DEFAULT_ARTIFACT_PATH: &str = "pokeemerald.gba";
