//! Per-channel summary of a MIDI file.
//!
//! Used to decide which channels need an entry in a channel-to-voice map.

use midly::{Format, MidiMessage, Smf, Timing, TrackEventKind};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{MidiError, MidiResult};
use crate::validate::check_signature;

/// General MIDI percussion channel (channel 10, zero-based 9).
pub const PERCUSSION_CHANNEL: u8 = 9;

/// What one channel does in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    pub channel: u8,
    /// Distinct program-change values seen.
    pub programs: BTreeSet<u8>,
    /// Any note-on or note-off seen.
    pub has_notes: bool,
    /// Note-ons with non-zero velocity.
    pub note_count: usize,
}

impl ChannelInfo {
    fn new(channel: u8) -> Self {
        Self {
            channel,
            ..Default::default()
        }
    }

    pub fn is_used(&self) -> bool {
        self.has_notes || !self.programs.is_empty()
    }
}

/// Channel usage summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiSummary {
    /// SMF format (0, 1, or 2).
    pub format: u16,
    pub track_count: usize,
    /// `None` when the file uses SMPTE timing.
    pub ticks_per_beat: Option<u16>,
    /// Channels with notes or program changes, ascending.
    pub used_channels: Vec<u8>,
    pub uses_percussion_channel: bool,
    /// Details for used channels only.
    pub channels: Vec<ChannelInfo>,
}

impl MidiSummary {
    pub fn channel(&self, channel: u8) -> Option<&ChannelInfo> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Summarizes MIDI bytes.
pub fn inspect_bytes(bytes: &[u8]) -> MidiResult<MidiSummary> {
    check_signature(bytes)?;
    let smf = Smf::parse(bytes).map_err(|e| MidiError::malformed(0, e.to_string()))?;

    let mut channels: Vec<ChannelInfo> = (0..16).map(ChannelInfo::new).collect();
    for track in &smf.tracks {
        for event in track {
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let info = &mut channels[usize::from(channel.as_int())];
            match message {
                MidiMessage::ProgramChange { program } => {
                    info.programs.insert(program.as_int());
                }
                MidiMessage::NoteOn { vel, .. } => {
                    info.has_notes = true;
                    if vel.as_int() > 0 {
                        info.note_count += 1;
                    }
                }
                MidiMessage::NoteOff { .. } => info.has_notes = true,
                _ => {}
            }
        }
    }

    let channels: Vec<ChannelInfo> = channels.into_iter().filter(ChannelInfo::is_used).collect();
    let used_channels: Vec<u8> = channels.iter().map(|c| c.channel).collect();

    Ok(MidiSummary {
        format: match smf.header.format {
            Format::SingleTrack => 0,
            Format::Parallel => 1,
            Format::Sequential => 2,
        },
        track_count: smf.tracks.len(),
        ticks_per_beat: match smf.header.timing {
            Timing::Metrical(ticks) => Some(ticks.as_int()),
            Timing::Timecode(..) => None,
        },
        uses_percussion_channel: used_channels.contains(&PERCUSSION_CHANNEL),
        used_channels,
        channels,
    })
}

/// Reads and summarizes the MIDI file at `path`.
pub fn inspect(path: &Path) -> MidiResult<MidiSummary> {
    let bytes = std::fs::read(path).map_err(|e| MidiError::read(path, e))?;
    inspect_bytes(&bytes)
}
