//! mp2k CLI library.
//!
//! Command implementations for indexing voice groups, inspecting and
//! rewriting MIDI files, and running ROM previews.

pub mod commands;
