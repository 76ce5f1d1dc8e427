//! yt-dlp driven as a subprocess

use super::{CacheControl, ExtractionEngine, FetchOptions, ProbeDepth, RawInfo};
use crate::config::EngineConfig;
use crate::error::VidgrabError;
use crate::Result;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Extraction engine backed by the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    config: EngineConfig,
}

/// Marker dropped into cache directories vidgrab set up itself
pub const CACHE_MARKER: &str = ".vidgrab-cache";

/// yt-dlp's on-disk cache (signature functions, tokens)
#[derive(Debug, Clone)]
pub struct YtDlpCache {
    dir: PathBuf,
}

impl YtDlpCache {
    /// Cache rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the cache directory and mark it as ours if it starts out empty.
    /// A directory that already holds foreign files is left unmarked.
    pub async fn claim(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let marker = self.dir.join(CACHE_MARKER);
        if tokio::fs::try_exists(&marker).await? {
            return Ok(());
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        if entries.next_entry().await?.is_none() {
            tokio::fs::write(&marker, b"").await?;
            debug!("Claimed engine cache at {}", self.dir.display());
        }
        Ok(())
    }

    /// Marked by us, or named like a cache directory
    async fn is_cache_dir(&self) -> bool {
        if tokio::fs::try_exists(self.dir.join(CACHE_MARKER))
            .await
            .unwrap_or(false)
        {
            return true;
        }
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .is_some_and(|name| name.contains("cache") || name.contains("tmp"))
    }
}

#[async_trait]
impl CacheControl for YtDlpCache {
    fn location(&self) -> PathBuf {
        self.dir.clone()
    }

    /// Remove everything inside the cache directory; the directory stays
    async fn clear(&self) -> Result<()> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut contents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name() != CACHE_MARKER {
                contents.push(entry);
            }
        }
        if contents.is_empty() {
            return Ok(());
        }

        if !self.is_cache_dir().await {
            return Err(VidgrabError::Engine(format!(
                "Refusing to clear {}: this does not look like a cache dir",
                self.dir.display()
            )));
        }

        for entry in contents {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                tokio::fs::remove_dir_all(&path).await?;
            } else {
                tokio::fs::remove_file(&path).await?;
            }
        }
        debug!("Cleared engine cache at {}", self.dir.display());
        Ok(())
    }
}

impl YtDlpEngine {
    /// Create a new engine
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Cache capability bound to this engine's cache directory
    pub fn cache_control(&self) -> Arc<YtDlpCache> {
        Arc::new(YtDlpCache::new(self.config.cache_dir.clone()))
    }

    /// Arguments shared by every invocation
    fn base_args(&self) -> Vec<String> {
        let c = &self.config;
        let mut args = vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-color".to_string(),
            "--socket-timeout".to_string(),
            c.socket_timeout.as_secs().max(1).to_string(),
            "--retries".to_string(),
            c.retries.to_string(),
            "--fragment-retries".to_string(),
            c.fragment_retries.to_string(),
            "--extractor-retries".to_string(),
            c.extractor_retries.to_string(),
            "--file-access-retries".to_string(),
            c.file_access_retries.to_string(),
            "--cache-dir".to_string(),
            c.cache_dir.to_string_lossy().into_owned(),
        ];
        for (name, value) in &c.http_headers {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }
        args
    }

    /// Arguments for a non-downloading metadata probe
    pub fn probe_args(&self, url: &str, depth: ProbeDepth) -> Vec<String> {
        let mut args = self.base_args();
        args.push("--dump-single-json".to_string());
        args.push("--skip-download".to_string());
        if depth == ProbeDepth::Shallow {
            args.push("--flat-playlist".to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for a downloading fetch
    pub fn fetch_args(&self, url: &str, options: &FetchOptions) -> Vec<String> {
        let mut args = self.base_args();
        args.extend([
            "--dump-single-json".to_string(),
            "--no-simulate".to_string(),
            "--format".to_string(),
            options.format.clone(),
            "--output".to_string(),
            options.output_template.clone(),
            "--merge-output-format".to_string(),
            options.merge_output_format.clone(),
        ]);
        if !options.write_thumbnail {
            args.push("--no-write-thumbnail".to_string());
        }
        if !options.write_subtitles {
            args.push("--no-write-subs".to_string());
        }
        if !options.write_automatic_subtitles {
            args.push("--no-write-auto-subs".to_string());
        }
        if let Some(container) = &options.convert_to {
            args.push("--recode-video".to_string());
            args.push(container.clone());
        }
        if options.keep_intermediate {
            args.push("--keep-video".to_string());
        }
        if options.first_item_only {
            args.push("--playlist-items".to_string());
            args.push("1".to_string());
        }
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    async fn run_json(&self, args: Vec<String>) -> Result<Option<RawInfo>> {
        self.cache_control().claim().await?;
        debug!("Running {} {:?}", self.config.binary.display(), args);

        let output = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    VidgrabError::Engine(format!(
                        "yt-dlp not found at {}",
                        self.config.binary.display()
                    ))
                } else {
                    VidgrabError::Engine(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        parse_output(
            output.status.success(),
            output.status.code(),
            &String::from_utf8_lossy(&output.stdout),
            &String::from_utf8_lossy(&output.stderr),
        )
    }
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(&self, url: &str, depth: ProbeDepth) -> Result<Option<RawInfo>> {
        self.run_json(self.probe_args(url, depth))
            .await
            .map_err(VidgrabError::into_resolution)
    }

    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Option<RawInfo>> {
        self.run_json(self.fetch_args(url, options)).await
    }
}

/// Turn a finished yt-dlp run into metadata or a classified error
fn parse_output(
    success: bool,
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<Option<RawInfo>> {
    if !success {
        return Err(VidgrabError::from_engine_output(failure_message(code, stderr)));
    }

    let stdout = stdout.trim();
    if stdout.is_empty() || stdout == "null" {
        return Ok(None);
    }

    // Some builds print one document per line; the last one is the final info
    let document = stdout.lines().last().unwrap_or(stdout);
    Ok(Some(serde_json::from_str(document)?))
}

fn failure_message(code: Option<i32>, stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        return errors.join("\n");
    }

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    match code {
        Some(code) => format!("yt-dlp exited with status {}", code),
        None => "yt-dlp terminated by signal".to_string(),
    }
}
