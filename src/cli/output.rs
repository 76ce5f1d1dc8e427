//! Output formatting and spinner display

use crate::cli::args::VerbosityLevel;
use crate::core::{Failure, MediaInfo, SavedFile};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Output formatter for vidgrab
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    json: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel, json: bool) -> Self {
        Self { verbosity, json }
    }

    /// Start a spinner for a long-running engine call
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if self.json || self.verbosity == VerbosityLevel::Quiet {
            return None;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("✅ {}", message.green());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red());
    }

    /// Print a payload as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print media information and its variant table
    pub fn print_media_info(&self, info: &MediaInfo) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("📹 {}", info.title.bold());
        println!("🌐 {} ({})", info.source_key, info.canonical_url);
        println!(
            "⏱️  {}",
            format_duration(Duration::from_secs(info.duration_seconds))
        );
        if self.verbosity == VerbosityLevel::Verbose && !info.thumbnail_url.is_empty() {
            println!("🖼️  {}", info.thumbnail_url);
        }
        println!("📊 {} variants available", info.variants.len());
        if let Some(best) = info.best_variant() {
            println!("⭐ Best: {} ({})", best.id.cyan(), best.description);
        }

        if info.variants.is_empty() {
            return;
        }
        println!();
        println!(
            "  {:<12} {:<6} {:<12} {}",
            "ID".bold(),
            "EXT".bold(),
            "CODECS".bold(),
            "DESCRIPTION".bold()
        );
        for variant in &info.variants {
            let codecs = format!(
                "{}+{}",
                short_codec(&variant.video_codec),
                short_codec(&variant.audio_codec)
            );
            println!(
                "  {:<12} {:<6} {:<12} {}",
                variant.id.cyan(),
                variant.container,
                codecs,
                variant.description
            );
        }
    }

    /// Print download start message
    pub fn print_download_start(&self, url: &str, destination: &Path) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("🚀 Starting download...");
        println!("🔗 URL: {}", url);
        println!("💾 Output: {}", destination.display());
        println!();
    }

    /// Print download complete message
    pub fn print_download_complete(&self, saved: &SavedFile, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        self.success(&format!("Download completed: {}", saved.filename));
        println!("💾 Saved to: {}", saved.path.display());
        println!("⏱️  Time: {}", format_duration(elapsed));
    }

    /// Print a failed operation
    pub fn print_failure(&self, failure: &Failure) {
        self.error(&failure.error);
    }
}

fn short_codec(codec: &str) -> &str {
    codec.split('.').next().unwrap_or(codec)
}

/// Format duration as human-readable string
fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if seconds == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, seconds)
        }
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}
