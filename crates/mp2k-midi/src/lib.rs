//! MIDI handling for mp2k previews.
//!
//! - [`validate`] - four-byte `MThd` signature check
//! - [`rewrite`] - program-change rewriting driven by a [`ChannelVoiceMap`](mp2k_core::ChannelVoiceMap)
//! - [`inspect`] - per-channel usage summary
//! - [`smf`] - byte-offset chunk and event walker used by the rewriter
//!
//! # Example
//!
//! ```no_run
//! use mp2k_core::{ChannelVoiceMap, RewriteMode};
//! use std::path::Path;
//!
//! let mut map = ChannelVoiceMap::new();
//! map.insert(0, 2)?;
//!
//! mp2k_midi::validate(Path::new("song.mid"))?;
//! mp2k_midi::rewrite_file(
//!     Path::new("song.mid"),
//!     Path::new("song_mapped.mid"),
//!     &map,
//!     RewriteMode::RewriteAll,
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod inspect;
pub mod rewrite;
pub mod smf;
pub mod validate;

pub use error::{MidiError, MidiResult};
pub use inspect::{inspect, inspect_bytes, ChannelInfo, MidiSummary, PERCUSSION_CHANNEL};
pub use rewrite::{rewrite, rewrite_file, rewrite_with_summary, RewriteSummary};
pub use validate::{check_signature, has_signature, validate, MIDI_SIGNATURE};
