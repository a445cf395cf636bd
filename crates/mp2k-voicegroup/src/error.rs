//! Error types for voicegroup indexing.

use mp2k_core::{ErrorKind, PreviewFailure};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for indexing operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors that can occur while building or persisting a voicegroup index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The root manifest is missing.
    #[error("voice group manifest not found at: {path}")]
    ManifestNotFound { path: PathBuf },

    /// The manifest resolved to no readable include, or the includes held no groups.
    #[error("no voice groups found via {manifest} ({resolved} include(s) resolved)")]
    EmptyIndex { manifest: PathBuf, resolved: usize },

    /// Reading a manifest or included file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the JSON index failed.
    #[error("failed to write index to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON index could not be encoded or decoded.
    #[error("invalid index JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PreviewFailure for IndexError {
    fn kind(&self) -> ErrorKind {
        match self {
            IndexError::ManifestNotFound { .. } => ErrorKind::NotFound,
            IndexError::EmptyIndex { .. } => ErrorKind::EmptyIndex,
            IndexError::Read { source, .. } => ErrorKind::from_io(source),
            IndexError::Write { .. } | IndexError::Json(_) => ErrorKind::IoError,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            IndexError::ManifestNotFound { .. } => "INDEX_001",
            IndexError::EmptyIndex { .. } => "INDEX_002",
            IndexError::Read { .. } => "INDEX_003",
            IndexError::Write { .. } => "INDEX_004",
            IndexError::Json(_) => "INDEX_005",
        }
    }
}
