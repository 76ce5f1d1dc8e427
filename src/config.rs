//! Runtime configuration

use crate::core::ArtifactPolicy;
use crate::download::RetryConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the yt-dlp executable
pub const YTDLP_ENV: &str = "VIDGRAB_YTDLP";

/// Environment variable overriding the default download directory
pub const DOWNLOAD_DIR_ENV: &str = "VIDGRAB_DOWNLOAD_DIR";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Engine-level knobs passed through to yt-dlp on every invocation
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// yt-dlp executable
    pub binary: PathBuf,
    /// Cache directory owned by this process
    pub cache_dir: PathBuf,
    /// Per-request socket timeout
    pub socket_timeout: Duration,
    pub retries: u32,
    pub fragment_retries: u32,
    pub extractor_retries: u32,
    pub file_access_retries: u32,
    /// Extra HTTP headers, User-Agent included
    pub http_headers: Vec<(String, String)>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let binary = std::env::var_os(YTDLP_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("yt-dlp"));
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("vidgrab")
            .join("yt-dlp");

        Self {
            binary,
            cache_dir,
            socket_timeout: Duration::from_secs(30),
            retries: 10,
            fragment_retries: 10,
            extractor_retries: 3,
            file_access_retries: 3,
            http_headers: vec![
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                (
                    "Accept".to_string(),
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
                ),
                ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
                ("Accept-Encoding".to_string(), "gzip, deflate, br".to_string()),
            ],
        }
    }
}

/// Main configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Where downloads land when the request names no directory
    pub default_download_dir: PathBuf,
    /// Parent for per-operation scratch directories (system temp when unset)
    pub scratch_root: Option<PathBuf>,
    /// Container tracks are merged and converted into
    pub container: String,
    /// Which scratch file counts as the result
    pub artifact_policy: ArtifactPolicy,
    pub retry: RetryConfig,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_download_dir: default_download_dir(),
            scratch_root: None,
            container: "mp4".to_string(),
            artifact_policy: ArtifactPolicy::for_container("mp4"),
            retry: RetryConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Set default download directory
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_download_dir = dir.into();
        self
    }

    /// Set scratch root
    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    /// Set output container; a container-derived artifact policy follows it
    pub fn with_container(mut self, container: &str) -> Self {
        if self.artifact_policy == ArtifactPolicy::for_container(&self.container) {
            self.artifact_policy = ArtifactPolicy::for_container(container);
        }
        self.container = container.to_string();
        self
    }

    /// Set artifact selection policy
    pub fn with_artifact_policy(mut self, policy: ArtifactPolicy) -> Self {
        self.artifact_policy = policy;
        self
    }

    /// Set retry configuration
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set yt-dlp executable
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.engine.binary = binary.into();
        self
    }

    /// Set engine cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.engine.cache_dir = dir.into();
        self
    }

    /// Set socket timeout
    pub fn with_socket_timeout(mut self, timeout: Duration) -> Self {
        self.engine.socket_timeout = timeout;
        self
    }
}

/// `~/Downloads/VideoDownloader`, unless overridden through the environment
pub fn default_download_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DOWNLOAD_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
        .join("VideoDownloader")
}
