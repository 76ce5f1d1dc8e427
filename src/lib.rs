//! # vidgrab - media downloads over yt-dlp
//!
//! Resolves media URLs to normalized metadata and downloads a chosen variant
//! into a directory, recovering from HTTP 403 failures by clearing the
//! engine's cache and retrying.
//!
//! ## Features
//!
//! - Metadata with a ranked catalog of combined audio+video variants
//! - Scratch-directory downloads with collision-safe relocation
//! - Cache-resetting retries, serialized per cache location
//! - CLI and a small JSON HTTP API
//!
//! ## Example
//!
//! ```rust,no_run
//! use vidgrab::{Config, DownloadRequest, Downloader, Outcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let downloader = Downloader::new(Config::default().with_download_dir("./downloads"));
//!
//!     let request = DownloadRequest::new("VIDEO_URL").with_variant("18");
//!     match downloader.download(&request).await {
//!         Outcome::Success(saved) => println!("Saved {}", saved.path.display()),
//!         Outcome::Failure(failure) => eprintln!("{}", failure.error),
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod download;
pub mod engine;
pub mod error;
pub mod server;
pub mod utils;

// Re-export main types
pub use crate::config::Config;
pub use crate::core::{
    ArtifactPolicy, DownloadRequest, DownloadResult, Downloader, Failure, InfoResult, MediaInfo,
    Outcome, SavedFile, VariantDescriptor,
};
pub use crate::error::{ErrorKind, VidgrabError};

/// Result type alias for vidgrab operations
pub type Result<T> = std::result::Result<T, VidgrabError>;
