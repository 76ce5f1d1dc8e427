//! Main downloader implementation

use crate::config::Config;
use crate::core::executor::DownloadExecutor;
use crate::core::media_info::{DownloadRequest, DownloadResult, InfoResult, MediaInfo, SavedFile};
use crate::core::resolver::InfoResolver;
use crate::download::TransientRetrier;
use crate::engine::{CacheControl, ExtractionEngine, YtDlpEngine};
use crate::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point wiring engine, retrier, resolver and executor together
pub struct Downloader {
    config: Config,
    resolver: InfoResolver,
    executor: DownloadExecutor,
}

impl Downloader {
    /// Create a downloader backed by yt-dlp
    pub fn new(config: Config) -> Self {
        let engine = YtDlpEngine::new(config.engine.clone());
        let cache = engine.cache_control();
        Self::with_engine(config, Arc::new(engine), cache)
    }

    /// Create a downloader over any engine and cache capability
    pub fn with_engine(
        config: Config,
        engine: Arc<dyn ExtractionEngine>,
        cache: Arc<dyn CacheControl>,
    ) -> Self {
        let retrier = Arc::new(TransientRetrier::with_config(config.retry.clone(), cache.clone()));
        debug!(
            "Using {} with cache at {}, up to {} attempts",
            engine.name(),
            cache.location().display(),
            retrier.config().max_attempts
        );
        let resolver = InfoResolver::new(engine.clone(), retrier.clone());
        let executor = DownloadExecutor::new(engine, retrier, &config);

        Self {
            config,
            resolver,
            executor,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Default download directory
    pub fn default_download_dir(&self) -> &Path {
        &self.config.default_download_dir
    }

    /// Create the default download directory if it is missing
    pub async fn ensure_default_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.default_download_dir).await?;
        info!(
            "Default download directory: {}",
            self.config.default_download_dir.display()
        );
        Ok(())
    }

    /// Resolve metadata, keeping the typed error
    pub async fn resolve(&self, url: &str) -> Result<MediaInfo> {
        self.resolver.resolve(url).await
    }

    /// Resolve metadata for display or JSON output
    pub async fn info(&self, url: &str) -> InfoResult {
        self.resolver.resolve_info(url).await
    }

    /// Download, keeping the typed error
    pub async fn try_download(&self, request: &DownloadRequest) -> Result<SavedFile> {
        self.executor.try_execute(request).await
    }

    /// Download; failures come back as a marked message
    pub async fn download(&self, request: &DownloadRequest) -> DownloadResult {
        self.executor.execute(request).await
    }
}
