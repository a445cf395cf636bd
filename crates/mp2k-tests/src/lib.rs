//! mp2k End-to-End Test Infrastructure
//!
//! This crate provides integration tests for the flows a preview depends on:
//!
//! - Indexing: sound tree -> voicegroup index
//! - Rewriting: MIDI + channel map -> MIDI with new program bytes
//! - Preview: request -> staged MIDI, edited `midi.cfg`, build, launch
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mp2k-tests
//! ```
//!
//! The `system_toolchain` tests start real processes through `sh` and only
//! run on unix.

pub mod fixtures;
pub mod harness;

pub use fixtures::{SmfBuilder, TrackBuilder};
pub use harness::{BuildOutcome, RecordingToolchain, TestHarness};
