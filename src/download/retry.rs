//! Retry logic for engine-facing operations

use crate::engine::CacheControl;
use crate::error::VidgrabError;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One async lock per engine cache location
static CACHE_LEASES: LazyLock<std::sync::Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(Default::default);

fn lease_for(location: &Path) -> Arc<Mutex<()>> {
    let mut leases = CACHE_LEASES.lock().unwrap_or_else(PoisonError::into_inner);
    leases.entry(location.to_path_buf()).or_default().clone()
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the second attempt; zero disables backoff
    pub initial_delay: Duration,
    /// Maximum delay between attempts
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::ZERO,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }
}

/// Retries HTTP 403-class failures, wiping the engine cache before every attempt
pub struct TransientRetrier {
    config: RetryConfig,
    cache: Arc<dyn CacheControl>,
}

impl TransientRetrier {
    /// Create a new retrier with the default configuration
    pub fn new(cache: Arc<dyn CacheControl>) -> Self {
        Self::with_config(RetryConfig::default(), cache)
    }

    /// Create a new retrier with configuration
    pub fn with_config(config: RetryConfig, cache: Arc<dyn CacheControl>) -> Self {
        Self { config, cache }
    }

    /// Active retry configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or runs out of attempts. The last error is returned unchanged.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, VidgrabError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VidgrabError>>,
    {
        let location = self.cache.location();
        let lease = lease_for(&location);
        let _guard = lease.lock().await;
        debug!("Holding engine cache lease for {}", location.display());

        let max_attempts = self.config.max_attempts.max(1);
        let mut delay = self.config.initial_delay;
        let mut attempt = 1;

        loop {
            self.cache.clear().await?;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    warn!("Attempt {} failed, retrying... ({})", attempt, error);

                    if !delay.is_zero() {
                        tokio::time::sleep(self.with_jitter(delay)).await;
                        delay = Duration::from_millis(
                            (delay.as_millis() as f64 * self.config.backoff_multiplier) as u64,
                        )
                        .min(self.config.max_delay);
                    }

                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        if self.config.jitter_factor <= 0.0 {
            return delay;
        }
        let jitter_range = delay.as_millis() as f64 * self.config.jitter_factor;
        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
        delay + Duration::from_millis(jitter.abs() as u64)
    }
}

/// Retry configuration builder
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    /// Create a new retry configuration builder
    pub fn new() -> Self {
        Self {
            config: RetryConfig::default(),
        }
    }

    /// Set total attempts
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set initial delay
    pub fn initial_delay(mut self, initial_delay: Duration) -> Self {
        self.config.initial_delay = initial_delay;
        self
    }

    /// Set maximum delay
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.config.max_delay = max_delay;
        self
    }

    /// Set backoff multiplier
    pub fn backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.config.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Set jitter factor
    pub fn jitter_factor(mut self, jitter_factor: f64) -> Self {
        self.config.jitter_factor = jitter_factor.clamp(0.0, 1.0);
        self
    }

    /// Build the retry configuration
    pub fn build(self) -> RetryConfig {
        self.config
    }
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
