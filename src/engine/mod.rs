//! Extraction engine abstraction and its yt-dlp implementation

pub mod raw;
pub mod ytdlp;

pub use raw::*;
pub use ytdlp::*;

use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// How much work a metadata probe should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDepth {
    /// Resolve the URL without processing formats or playlist entries
    Shallow,
    /// Full metadata extraction, still without downloading media
    Full,
}

/// Options for a downloading fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    /// Format selector, a variant id or `best`
    pub format: String,
    /// Output template, e.g. `<dir>/%(title)s.%(ext)s`
    pub output_template: String,
    /// Container the separate tracks get merged into
    pub merge_output_format: String,
    /// Container the convertor post-processor transcodes to
    pub convert_to: Option<String>,
    pub write_thumbnail: bool,
    pub write_subtitles: bool,
    pub write_automatic_subtitles: bool,
    /// Retain intermediate media files after post-processing
    pub keep_intermediate: bool,
    /// Restrict a collection to its first item
    pub first_item_only: bool,
}

impl FetchOptions {
    /// Options for fetching into `dir` with the source title as base filename
    pub fn into_dir(dir: &Path, format: Option<&str>, container: &str) -> Self {
        Self {
            format: format.unwrap_or("best").to_string(),
            output_template: dir.join("%(title)s.%(ext)s").to_string_lossy().into_owned(),
            merge_output_format: container.to_string(),
            convert_to: Some(container.to_string()),
            write_thumbnail: false,
            write_subtitles: false,
            write_automatic_subtitles: false,
            keep_intermediate: true,
            first_item_only: false,
        }
    }
}

/// Engine-side cache that the retrier wipes before every attempt
#[async_trait]
pub trait CacheControl: Send + Sync {
    /// Directory holding the cache; used to serialize callers sharing it
    fn location(&self) -> PathBuf;

    /// Discard all cached state
    async fn clear(&self) -> Result<()>;
}

/// Opaque capability that understands a site's URLs and fetches media
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &'static str;

    /// Resolve metadata without downloading
    async fn probe(&self, url: &str, depth: ProbeDepth) -> Result<Option<RawInfo>>;

    /// Download and post-process media, returning the engine's metadata
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Option<RawInfo>>;
}
