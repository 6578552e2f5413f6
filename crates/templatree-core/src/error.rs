//! Error types for scanning, policy resolution and the codec.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across templatree.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Fatal errors. Per-file read failures are not errors; see [`ScanWarning`].
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Root path does not exist.
    #[error("Template directory '{path}' does not exist")]
    PathNotFound { path: PathBuf },

    /// Root path exists but is not a directory.
    #[error("'{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    /// A directory could not be listed.
    #[error("Error processing directory '{path}': {source}")]
    DirectoryListingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored text is not a valid encoded tree.
    #[error("Malformed template: {message}")]
    MalformedTemplate { message: String },

    /// A tree cannot be represented in the canonical form.
    #[error("Cannot serialize template: {message}")]
    SerializationFailed { message: String },

    /// A name pattern is not a valid regular expression.
    #[error("Invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Blob write, read or removal failed.
    #[error("Blob I/O error at {path}: {source}")]
    BlobIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Starter template key is not registered.
    #[error("Unknown template: {key}")]
    UnknownTemplate { key: String },
}

impl TemplateError {
    /// Map an I/O error on the scan root to the matching error kind.
    pub fn root_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                Self::PathNotFound { path }
            }
            _ => Self::DirectoryListingFailed { path, source },
        }
    }

    /// Create a directory listing error with path context.
    pub fn listing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryListingFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a blob I/O error with path context.
    pub fn blob(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::BlobIo {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedTemplate {
            message: message.into(),
        }
    }
}

/// Kind of non-fatal scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// File content could not be read or decoded as text.
    ReadError,
    /// File metadata could not be read.
    MetadataError,
    /// Entry type could not be determined; the entry was omitted.
    UnknownEntryType,
}

/// Non-fatal fault encountered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }

    /// Create a metadata error warning.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(
            path,
            format!("Metadata error: {error}"),
            WarningKind::MetadataError,
        )
    }

    /// Create a warning for an entry whose type could not be determined.
    pub fn unknown_entry_type(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(
            path,
            format!("Cannot determine entry type: {error}"),
            WarningKind::UnknownEntryType,
        )
    }
}
