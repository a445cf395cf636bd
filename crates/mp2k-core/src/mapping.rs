//! Channel-to-voice mapping used by the program-change rewriter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RangeViolation;

/// Highest MIDI channel number (channels are 0-15).
pub const MAX_CHANNEL: u8 = 15;

/// Highest voice slot a program change can address.
pub const MAX_VOICE_INDEX: i32 = 127;

/// Which program-change events on a mapped channel get rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    /// Every program change on the channel.
    #[default]
    RewriteAll,
    /// Only the first program change per channel across the whole file.
    RewriteFirstOnly,
}

impl RewriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteMode::RewriteAll => "all",
            RewriteMode::RewriteFirstOnly => "first",
        }
    }
}

/// Mapping from MIDI channel to target voice slot.
///
/// Voice targets are stored unchecked so that an out-of-range slot can be
/// reported as a range error by the rewriter instead of being silently
/// truncated. Channels are checked on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelVoiceMap {
    voices: BTreeMap<u8, i32>,
    /// Slot used for channels that have program changes but no explicit entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_voice: Option<i32>,
}

impl ChannelVoiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback slot for unmapped channels.
    pub fn with_default(mut self, voice: i32) -> Self {
        self.default_voice = Some(voice);
        self
    }

    pub fn set_default(&mut self, voice: Option<i32>) {
        self.default_voice = voice;
    }

    pub fn default_voice(&self) -> Option<i32> {
        self.default_voice
    }

    /// Maps `channel` to `voice`, returning the previous target if any.
    pub fn insert(&mut self, channel: u8, voice: i32) -> Result<Option<i32>, RangeViolation> {
        RangeViolation::check("channel", i64::from(channel), 0, i64::from(MAX_CHANNEL))?;
        Ok(self.voices.insert(channel, voice))
    }

    /// Explicit entries in channel order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, i32)> + '_ {
        self.voices.iter().map(|(&c, &v)| (c, v))
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty() && self.default_voice.is_none()
    }

    /// The unchecked target for `channel`: explicit entry, else the default.
    pub fn resolve(&self, channel: u8) -> Option<i32> {
        self.voices.get(&channel).copied().or(self.default_voice)
    }

    /// The checked target for `channel`, or `None` when the channel passes through.
    pub fn target_for(&self, channel: u8) -> Result<Option<u8>, RangeViolation> {
        match self.resolve(channel) {
            None => Ok(None),
            Some(voice) => {
                RangeViolation::check("voice index", i64::from(voice), 0, i64::from(MAX_VOICE_INDEX))?;
                // In 0..=127 after the check above.
                Ok(Some(voice as u8))
            }
        }
    }
}

/// A channel map together with the mode it should be applied in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewritePlan {
    pub map: ChannelVoiceMap,
    #[serde(default)]
    pub mode: RewriteMode,
}

impl RewritePlan {
    pub fn new(map: ChannelVoiceMap, mode: RewriteMode) -> Self {
        Self { map, mode }
    }
}
