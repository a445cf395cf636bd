//! Error kinds shared across indexing, rewriting, and preview builds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure categories reported by every component.
///
/// The set is closed: each crate's error enum maps onto exactly one of these
/// through [`PreviewFailure::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// An expected file or directory is absent.
    NotFound,
    /// The manifest was read but yielded no voice groups.
    EmptyIndex,
    /// The MIDI container signature or structure is wrong.
    InvalidFormat,
    /// A numeric parameter is outside its defined bound.
    RangeError,
    /// A filesystem read, write, or copy failed.
    #[serde(rename = "IOError")]
    IoError,
    /// The external build tool exited with a non-zero status.
    BuildFailure,
    /// The build reported success but its output is missing.
    MissingArtifact,
}

impl ErrorKind {
    /// Returns the stable name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::EmptyIndex => "EmptyIndex",
            ErrorKind::InvalidFormat => "InvalidFormat",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::IoError => "IOError",
            ErrorKind::BuildFailure => "BuildFailure",
            ErrorKind::MissingArtifact => "MissingArtifact",
        }
    }

    /// Classifies an I/O error: a missing path is `NotFound`, anything else `IOError`.
    pub fn from_io(err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::IoError
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common trait for component errors.
///
/// Each crate's error type implements this so failures can be reported
/// uniformly, e.g. by the orchestrator when it tags an error with the stage
/// that produced it.
pub trait PreviewFailure: std::error::Error {
    /// The failure category.
    fn kind(&self) -> ErrorKind;

    /// Stable code such as `"INDEX_001"` or `"MIDI_003"`.
    fn code(&self) -> &'static str;

    /// Human-readable description; defaults to `Display`.
    fn message(&self) -> String {
        self.to_string()
    }
}

/// A value fell outside its inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct RangeViolation {
    /// Name of the offending parameter.
    pub field: &'static str,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl RangeViolation {
    /// Checks `min <= value <= max`.
    pub fn check(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(Self {
                field,
                value,
                min,
                max,
            })
        }
    }
}

impl PreviewFailure for RangeViolation {
    fn kind(&self) -> ErrorKind {
        ErrorKind::RangeError
    }

    fn code(&self) -> &'static str {
        "RANGE_001"
    }
}
