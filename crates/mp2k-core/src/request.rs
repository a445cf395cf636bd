//! Parameters of a single preview build.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::RangeViolation;
use crate::mapping::RewritePlan;

/// Highest accepted song volume.
pub const MAX_VOLUME: u8 = 127;
/// Highest accepted reverb amount.
pub const MAX_REVERB: u8 = 127;
/// Highest accepted song priority.
pub const MAX_PRIORITY: u8 = 15;

/// Everything one preview attempt needs.
///
/// Built once by the caller and consumed by the orchestrator; nothing in the
/// pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Root of the game repository that gets built.
    pub repo_root: PathBuf,
    /// MIDI file to preview.
    pub source_midi: PathBuf,
    /// Voice group suffix written to the build config (e.g. `route101`).
    pub voicegroup_name: String,
    pub volume: u8,
    pub reverb: u8,
    pub priority: u8,
    /// Emulator executable launched with the built ROM.
    pub emulator_path: PathBuf,
    /// Optional program-change rewrite applied before staging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrite: Option<RewritePlan>,
}

impl PreviewRequest {
    /// Default volume used by the preview slot.
    pub const DEFAULT_VOLUME: u8 = 90;
    /// Default reverb used by the preview slot.
    pub const DEFAULT_REVERB: u8 = 50;

    /// Creates a request with default volume, reverb, and priority.
    pub fn new(
        repo_root: impl Into<PathBuf>,
        source_midi: impl Into<PathBuf>,
        voicegroup_name: impl Into<String>,
        emulator_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repo_root: repo_root.into(),
            source_midi: source_midi.into(),
            voicegroup_name: voicegroup_name.into(),
            volume: Self::DEFAULT_VOLUME,
            reverb: Self::DEFAULT_REVERB,
            priority: 0,
            emulator_path: emulator_path.into(),
            rewrite: None,
        }
    }

    pub fn volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self
    }

    pub fn reverb(mut self, reverb: u8) -> Self {
        self.reverb = reverb;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Attaches a channel rewrite to run before staging.
    pub fn rewrite(mut self, plan: RewritePlan) -> Self {
        self.rewrite = Some(plan);
        self
    }

    /// Checks volume, reverb, and priority against their bounds.
    pub fn validate_ranges(&self) -> Result<(), RangeViolation> {
        check_playback_ranges(self.volume, self.reverb, self.priority)
    }
}

/// Checks `volume <= 127`, `reverb <= 127`, `priority <= 15`.
pub fn check_playback_ranges(volume: u8, reverb: u8, priority: u8) -> Result<(), RangeViolation> {
    RangeViolation::check("volume", i64::from(volume), 0, i64::from(MAX_VOLUME))?;
    RangeViolation::check("reverb", i64::from(reverb), 0, i64::from(MAX_REVERB))?;
    RangeViolation::check("priority", i64::from(priority), 0, i64::from(MAX_PRIORITY))
}
