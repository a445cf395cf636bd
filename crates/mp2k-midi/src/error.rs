//! Error types for MIDI handling.

use mp2k_core::{ErrorKind, PreviewFailure, RangeViolation};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for MIDI operations.
pub type MidiResult<T> = Result<T, MidiError>;

/// Errors raised while validating, inspecting, or rewriting MIDI data.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The input file does not exist.
    #[error("MIDI file not found: {path}")]
    NotFound { path: PathBuf },

    /// The first four bytes are not `MThd`.
    #[error("not a valid MIDI file (missing MThd header, found {found:02X?})")]
    InvalidSignature { found: Vec<u8> },

    /// The container structure is broken past the signature.
    #[error("malformed MIDI data at offset {offset}: {message}")]
    Malformed { offset: usize, message: String },

    /// A resolved voice target or channel is out of range.
    #[error(transparent)]
    Range(#[from] RangeViolation),

    /// Reading the input failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the output failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MidiError {
    pub(crate) fn malformed(offset: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Read { path, source }
        }
    }
}

impl PreviewFailure for MidiError {
    fn kind(&self) -> ErrorKind {
        match self {
            MidiError::NotFound { .. } => ErrorKind::NotFound,
            MidiError::InvalidSignature { .. } | MidiError::Malformed { .. } => {
                ErrorKind::InvalidFormat
            }
            MidiError::Range(_) => ErrorKind::RangeError,
            MidiError::Read { .. } | MidiError::Write { .. } => ErrorKind::IoError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            MidiError::NotFound { .. } => "MIDI_001",
            MidiError::InvalidSignature { .. } => "MIDI_002",
            MidiError::Malformed { .. } => "MIDI_003",
            MidiError::Range(_) => "MIDI_004",
            MidiError::Read { .. } => "MIDI_005",
            MidiError::Write { .. } => "MIDI_006",
        }
    }
}
