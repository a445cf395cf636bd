//! `--map CHANNEL=VOICE` parsing shared by `rewrite` and `preview`.

use anyhow::{Context, Result};
use mp2k_core::{ChannelVoiceMap, RewriteMode, RewritePlan, VoiceGroup};
use std::fmt;
use std::str::FromStr;

/// One `CHANNEL=VOICE` pair from the command line.
///
/// The voice is kept signed so that an out-of-range target reaches the
/// rewriter and is reported as a range error instead of a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapArg {
    pub channel: u8,
    pub voice: i32,
}

impl FromStr for MapArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (channel, voice) = s
            .split_once('=')
            .ok_or_else(|| format!("expected CHANNEL=VOICE, got '{}'", s))?;
        let channel = channel
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("invalid channel '{}': {}", channel.trim(), e))?;
        let voice = voice
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid voice '{}': {}", voice.trim(), e))?;
        Ok(Self { channel, voice })
    }
}

impl fmt::Display for MapArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.channel, self.voice)
    }
}

/// Builds a rewrite plan from command-line flags.
///
/// Returns `None` when no mapping and no default voice were given.
pub fn build_plan(
    pairs: &[MapArg],
    default_voice: Option<i32>,
    first_only: bool,
) -> Result<Option<RewritePlan>> {
    if pairs.is_empty() && default_voice.is_none() {
        return Ok(None);
    }

    let mut map = ChannelVoiceMap::new();
    map.set_default(default_voice);
    for pair in pairs {
        map.insert(pair.channel, pair.voice)
            .with_context(|| format!("invalid --map {}", pair))?;
    }

    let mode = if first_only {
        RewriteMode::RewriteFirstOnly
    } else {
        RewriteMode::RewriteAll
    };
    Ok(Some(RewritePlan::new(map, mode)))
}

/// Slots the map targets that do not exist in `group`, as `(channel, voice)`.
///
/// A default voice is reported with channel `None`.
pub fn slots_past_end(map: &ChannelVoiceMap, group: &VoiceGroup) -> Vec<(Option<u8>, i32)> {
    let len = group.len() as i64;
    let mut past = Vec::new();
    for (channel, voice) in map.entries() {
        if i64::from(voice) >= len {
            past.push((Some(channel), voice));
        }
    }
    if let Some(voice) = map.default_voice() {
        if i64::from(voice) >= len {
            past.push((None, voice));
        }
    }
    past
}
