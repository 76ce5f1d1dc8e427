//! Command line argument parsing

use crate::config::Config;
use crate::core::ArtifactPolicy;
use crate::download::RetryConfigBuilder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// vidgrab - download media through yt-dlp with cache-resetting retries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Engine socket timeout (e.g., 30s, 1m)
    #[arg(long, global = true, value_name = "DURATION", default_value = "30s")]
    pub timeout: humantime::Duration,

    /// Attempts per operation when the origin answers 403
    #[arg(long, global = true, default_value = "3")]
    pub attempts: u32,

    /// Initial delay between attempts (0s retries immediately)
    #[arg(long, global = true, value_name = "DURATION", default_value = "0s")]
    pub backoff: humantime::Duration,

    /// Path to the yt-dlp executable
    #[arg(long, global = true, value_name = "PATH")]
    pub ytdlp: Option<PathBuf>,

    /// Engine cache directory (cleared before every attempt)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Parent directory for scratch space
    #[arg(long, global = true, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Container tracks are merged into
    #[arg(long, global = true, value_name = "EXT", default_value = "mp4")]
    pub container: String,

    /// Which scratch file is the result: first, newest, largest or ext:<ext>
    /// (default: ext:<container>)
    #[arg(long, global = true, value_name = "POLICY")]
    pub artifact_policy: Option<ArtifactPolicy>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show title, duration and downloadable variants
    Info {
        /// Media page URL
        url: String,

        /// Print the JSON payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download a variant into a directory
    Download {
        /// Media page URL
        url: String,

        /// Variant id (from `info`); best combined variant when omitted
        #[arg(short, long, value_name = "ID")]
        format: Option<String>,

        /// Destination directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the JSON payload instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print the default download directory
    DefaultDir {
        /// Print the JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },
}

impl Args {
    /// Get socket timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        self.timeout.into()
    }

    /// Get initial retry delay as Duration
    pub fn backoff_duration(&self) -> Duration {
        self.backoff.into()
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Whether the subcommand asked for JSON output
    pub fn json_output(&self) -> bool {
        match &self.command {
            Command::Info { json, .. }
            | Command::Download { json, .. }
            | Command::DefaultDir { json } => *json,
            Command::Serve { .. } => false,
        }
    }

    /// Build the runtime configuration from flags and environment
    pub fn to_config(&self) -> Config {
        let retry = RetryConfigBuilder::new()
            .max_attempts(self.attempts)
            .initial_delay(self.backoff_duration())
            .build();

        let mut config = Config::default()
            .with_container(&self.container)
            .with_retry(retry)
            .with_socket_timeout(self.timeout_duration());

        if let Some(policy) = &self.artifact_policy {
            config = config.with_artifact_policy(policy.clone());
        }
        if let Some(binary) = &self.ytdlp {
            config = config.with_binary(binary);
        }
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir);
        }
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_root(dir);
        }
        config
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: Command::DefaultDir { json: false },
            timeout: humantime::Duration::from(Duration::from_secs(30)),
            attempts: 3,
            backoff: humantime::Duration::from(Duration::ZERO),
            ytdlp: None,
            cache_dir: None,
            scratch_dir: None,
            container: "mp4".to_string(),
            artifact_policy: None,
            verbose: false,
            quiet: false,
        }
    }
}
