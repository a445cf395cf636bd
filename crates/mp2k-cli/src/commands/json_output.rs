//! JSON output types for machine-readable CLI output.
//!
//! Every command's `--json` flag prints one [`JsonOutput`] document on stdout.

use mp2k_core::PreviewFailure;
use serde::Serialize;

/// Error codes for CLI-level failures (library failures carry their own codes).
pub mod error_codes {
    /// No sound directory given and none remembered
    pub const NO_SOUND_DIR: &str = "CLI_001";
    /// Requested voice group is not in the index
    pub const UNKNOWN_VOICEGROUP: &str = "CLI_002";
    /// Invalid command-line argument
    pub const INVALID_ARGUMENT: &str = "CLI_003";
}

/// Warning codes.
pub mod warning_codes {
    /// An include listed in the manifest does not exist
    pub const MISSING_INCLUDE: &str = "CLI_W001";
    /// A group name was defined again and ignored
    pub const DUPLICATE_GROUP: &str = "CLI_W002";
    /// A mapped voice slot is past the end of the voice group
    pub const SLOT_PAST_END: &str = "CLI_W003";
    /// Settings could not be saved
    pub const SETTINGS_NOT_SAVED: &str = "CLI_W004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g. "MIDI_002", "CLI_001")
    pub code: String,
    /// Failure category (e.g. "InvalidFormat")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub message: String,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: None,
            message: message.into(),
        }
    }

    /// Builds an error from a library failure.
    pub fn from_failure<E: PreviewFailure>(err: &E) -> Self {
        Self {
            code: err.code().to_string(),
            kind: Some(err.kind().to_string()),
            message: err.message(),
        }
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonWarning {
    pub code: String,
    pub message: String,
}

impl JsonWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Top-level JSON document for one command.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<JsonWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(result: T, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
        }
    }

    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            errors: vec![error],
            warnings: Vec::new(),
            result: None,
        }
    }

    /// Prints the document as pretty JSON on stdout.
    pub fn print(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        println!("{}", json);
        Ok(())
    }
}
