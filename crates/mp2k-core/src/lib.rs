//! mp2k Preview Core Types
//!
//! This crate holds the data model shared by the voicegroup indexer, the MIDI
//! rewriter, and the preview build orchestrator.
//!
//! # Overview
//!
//! The handheld sound engine selects instruments through numbered slots inside
//! a named *voice group*. A MIDI program-change value is an index into whichever
//! group is active for the song, so previewing a composition requires:
//!
//! - **An index** of which voice occupies which slot ([`VoicegroupIndex`])
//! - **A channel map** choosing a slot per MIDI channel ([`ChannelVoiceMap`])
//! - **A request** describing one preview build ([`PreviewRequest`])
//!
//! Every failure anywhere in the tooling is classified into one of the
//! [`ErrorKind`] variants so callers can tell a malformed MIDI file apart from a
//! failed build.
//!
//! # Example
//!
//! ```
//! use mp2k_core::{ChannelVoiceMap, VoiceGroup, VoiceKind};
//!
//! let mut group = VoiceGroup::new("route101");
//! group.push("voice_directsound", "60, 0, DirectSoundWaveData_piano", "route101.inc");
//! group.push("voice_square_1", "60, 0, 0, 2, 0, 0, 15, 0", "route101.inc");
//! assert_eq!(group.entry(1).map(|e| e.kind), Some(VoiceKind::Square));
//!
//! let mut map = ChannelVoiceMap::new();
//! map.insert(0, 1).unwrap();
//! assert_eq!(map.target_for(0).unwrap(), Some(1));
//! ```

pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod request;
pub mod voice;

pub use error::{ErrorKind, PreviewFailure, RangeViolation};
pub use mapping::{ChannelVoiceMap, RewriteMode, RewritePlan, MAX_CHANNEL, MAX_VOICE_INDEX};
pub use pipeline::{PipelineResult, Stage, StageTiming};
pub use request::{check_playback_ranges, PreviewRequest, MAX_PRIORITY, MAX_REVERB, MAX_VOLUME};
pub use voice::{VoiceEntry, VoiceGroup, VoiceKind, VoicegroupIndex};
