//! Error types for vidgrab

use serde::Serialize;
use std::sync::LazyLock;
use thiserror::Error;

/// Marker every user-facing error message starts with
pub const ERROR_MARKER: &str = "ERROR:";

static HTTP_STATUS: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"HTTP Error (\d{3})").expect("static regex"));

/// Closed set of failure classes carried alongside every error message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No metadata, no title, or an empty collection
    Resolution,
    /// HTTP 403-class rejection, retried after clearing the engine cache
    TransientNetwork,
    /// Fetch failed or produced nothing
    Download,
    /// No artifact on disk, or relocation failed
    Filesystem,
    /// Caller supplied something unusable
    InvalidInput,
    /// Engine missing, crashed, or returned unparsable output
    #[default]
    Engine,
}

/// Main error type for vidgrab operations
#[derive(Debug, Error)]
pub enum VidgrabError {
    #[error("{0}")]
    Resolution(String),

    #[error("{0}")]
    TransientNetwork(String),

    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Filesystem(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Extraction engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl VidgrabError {
    /// Failure class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VidgrabError::Resolution(_) => ErrorKind::Resolution,
            VidgrabError::TransientNetwork(_) => ErrorKind::TransientNetwork,
            VidgrabError::Download(_) => ErrorKind::Download,
            VidgrabError::Filesystem(_) | VidgrabError::IoError(_) => ErrorKind::Filesystem,
            VidgrabError::InvalidUrl(_) | VidgrabError::UrlError(_) => ErrorKind::InvalidInput,
            VidgrabError::Engine(_) | VidgrabError::JsonError(_) => ErrorKind::Engine,
        }
    }

    /// Check if error is worth another attempt after clearing the engine cache
    pub fn is_transient(&self) -> bool {
        matches!(self, VidgrabError::TransientNetwork(_)) || is_forbidden(&self.to_string())
    }

    /// Classify a failure reported by the extraction engine
    pub fn from_engine_output(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_forbidden(&message) {
            VidgrabError::TransientNetwork(message)
        } else {
            VidgrabError::Download(message)
        }
    }

    /// Reclassify a non-transient engine failure seen while only resolving metadata
    pub fn into_resolution(self) -> Self {
        match self {
            VidgrabError::Download(message) => VidgrabError::Resolution(message),
            other => other,
        }
    }

    /// Message as shown to users, always carrying the error marker
    pub fn user_message(&self) -> String {
        with_error_marker(&self.to_string())
    }
}

/// Prefix a message with the error marker unless it already has one
pub fn with_error_marker(message: &str) -> String {
    if message.contains(ERROR_MARKER) {
        message.to_string()
    } else {
        format!("{} {}", ERROR_MARKER, message)
    }
}

fn is_forbidden(message: &str) -> bool {
    HTTP_STATUS
        .captures_iter(message)
        .any(|caps| &caps[1] == "403")
}
