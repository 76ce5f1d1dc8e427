//! URL to normalized media metadata

use crate::core::catalog::FormatCatalog;
use crate::core::media_info::{InfoResult, MediaInfo};
use crate::download::TransientRetrier;
use crate::engine::{ExtractionEngine, ProbeDepth, RawInfo};
use crate::error::VidgrabError;
use crate::utils::validate_media_url;
use crate::Result;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Resolves URLs to [`MediaInfo`] through the extraction engine
pub struct InfoResolver {
    engine: Arc<dyn ExtractionEngine>,
    retrier: Arc<TransientRetrier>,
}

impl InfoResolver {
    /// Create a new resolver
    pub fn new(engine: Arc<dyn ExtractionEngine>, retrier: Arc<TransientRetrier>) -> Self {
        Self { engine, retrier }
    }

    /// Resolve a URL, retrying transient failures
    pub async fn resolve(&self, url: &str) -> Result<MediaInfo> {
        let url = validate_media_url(url)?;
        let url = url.as_str();
        info!("Resolving info for {} via {}", url, self.engine.name());

        self.retrier.run(|| self.resolve_once(url)).await
    }

    /// Resolve a URL and flatten any failure into a marked message
    pub async fn resolve_info(&self, url: &str) -> InfoResult {
        let result = self.resolve(url).await;
        if let Err(e) = &result {
            error!("Final error in resolve: {}", e.user_message());
        }
        result.into()
    }

    async fn resolve_once(&self, url: &str) -> Result<MediaInfo> {
        if self.engine.probe(url, ProbeDepth::Shallow).await?.is_none() {
            return Err(VidgrabError::Resolution(
                "Could not retrieve video information".to_string(),
            ));
        }

        let raw = self
            .engine
            .probe(url, ProbeDepth::Full)
            .await?
            .ok_or_else(|| {
                VidgrabError::Resolution("Could not retrieve video information".to_string())
            })?;

        if raw.is_collection() {
            debug!("{} is a collection, using its first entry", url);
        }
        let item = raw.into_representative()?;

        build_media_info(item, url)
    }
}

/// Assemble [`MediaInfo`] from one item, filling defaults for missing fields
pub fn build_media_info(item: RawInfo, url: &str) -> Result<MediaInfo> {
    let title = item
        .title()
        .ok_or_else(|| VidgrabError::Resolution("Could not retrieve video title".to_string()))?
        .to_string();

    let catalog = FormatCatalog::from_raw(&item.formats);
    debug!("{} combined variants for {}", catalog.len(), title);

    Ok(MediaInfo {
        title,
        duration_seconds: item.duration.filter(|d| *d > 0.0).map_or(0, |d| d as u64),
        thumbnail_url: item.thumbnail.unwrap_or_default(),
        canonical_url: item.webpage_url.unwrap_or_else(|| url.to_string()),
        description: item.description.unwrap_or_default(),
        variants: catalog.into_variants(),
        source_name: item.extractor.unwrap_or_else(|| "generic".to_string()),
        source_key: item.extractor_key.unwrap_or_else(|| "Generic".to_string()),
    })
}
