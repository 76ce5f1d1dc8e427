//! Media metadata and request/result types

use crate::error::{with_error_marker, ErrorKind, VidgrabError};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::path::PathBuf;

/// One encoded rendition of a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDescriptor {
    /// Engine format id, unique per item
    #[serde(rename = "format_id")]
    pub id: String,
    /// Container extension (e.g. "mp4", "webm")
    #[serde(rename = "ext")]
    pub container: String,
    /// Resolution label such as "1280x720"
    pub resolution: String,
    /// File size in bytes (if known)
    #[serde(rename = "filesize")]
    pub size_bytes: Option<u64>,
    #[serde(rename = "vcodec")]
    pub video_codec: String,
    #[serde(rename = "acodec")]
    pub audio_codec: String,
    /// Display text, e.g. "1280x720 (mp4) - 12.3 MB"
    pub description: String,
}

/// Normalized metadata for one media item
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaInfo {
    pub title: String,
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: u64,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "webpage_url")]
    pub canonical_url: String,
    pub description: String,
    /// Combined audio+video variants, best first
    #[serde(rename = "formats")]
    pub variants: Vec<VariantDescriptor>,
    /// Extractor that handled the URL
    #[serde(rename = "extractor")]
    pub source_name: String,
    #[serde(rename = "extractor_key")]
    pub source_key: String,
}

impl MediaInfo {
    /// Best variant by the catalog's ordering
    pub fn best_variant(&self) -> Option<&VariantDescriptor> {
        self.variants.first()
    }
}

/// What to download and where
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: String,
    /// Variant id; `None` lets the engine pick the best one
    #[serde(rename = "format_id", default)]
    pub variant_id: Option<String>,
    /// Destination; `None` uses the default download directory
    #[serde(rename = "download_dir", default)]
    pub destination_dir: Option<PathBuf>,
}

impl DownloadRequest {
    /// Request for `url` with the best variant and default directory
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the variant id
    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Set the destination directory
    pub fn with_destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination_dir = Some(dir.into());
        self
    }
}

/// A file that landed in the destination directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub filename: String,
    pub path: PathBuf,
}

impl Serialize for SavedFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("filename", &self.filename)?;
        map.serialize_entry("path", &self.path.to_string_lossy())?;
        map.end()
    }
}

/// Failure as it crosses the public boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    #[serde(skip)]
    pub kind: ErrorKind,
    /// Message starting with the error marker
    pub error: String,
}

impl Failure {
    /// Failure of `kind`, marking the message if needed
    pub fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            error: with_error_marker(message),
        }
    }
}

impl From<VidgrabError> for Failure {
    fn from(error: VidgrabError) -> Self {
        Self {
            kind: error.kind(),
            error: error.user_message(),
        }
    }
}

/// Result of a public operation: exactly one of success or failure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Success value, if any
    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Failure, if any
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }
}

impl<T> From<Result<T, VidgrabError>> for Outcome<T> {
    fn from(result: Result<T, VidgrabError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error.into()),
        }
    }
}

/// Outcome of a download
pub type DownloadResult = Outcome<SavedFile>;

/// Outcome of an info lookup
pub type InfoResult = Outcome<MediaInfo>;
