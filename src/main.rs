//! Main entry point for vidgrab CLI

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidgrab::cli::{Args, Command, OutputFormatter, VerbosityLevel};
use vidgrab::{DownloadRequest, Downloader, Outcome};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    init_logging(args.verbosity_level())?;
    debug!("Starting vidgrab with args: {:?}", args);

    let formatter = OutputFormatter::new(args.verbosity_level(), args.json_output());
    let downloader = Downloader::new(args.to_config());

    downloader
        .ensure_default_dir()
        .await
        .context("failed to create default download directory")?;

    match args.command {
        Command::Info { url, json } => handle_info(&downloader, &formatter, &url, json).await,
        Command::Download {
            url,
            format,
            output,
            json,
        } => {
            let mut request = DownloadRequest::new(url);
            request.variant_id = format;
            request.destination_dir = output;
            handle_download(&downloader, &formatter, &request, json).await
        }
        Command::DefaultDir { json } => {
            let path = downloader.default_download_dir();
            if json {
                formatter.print_json(&serde_json::json!({ "path": path.to_string_lossy() }))?;
            } else {
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { host, port } => {
            let addr = format!("{}:{}", host, port);
            formatter.info(&format!("Serving API on http://{}", addr));
            vidgrab::server::serve(Arc::new(downloader), &addr)
                .await
                .with_context(|| format!("server on {} failed", addr))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Handle metadata lookup
async fn handle_info(
    downloader: &Downloader,
    formatter: &OutputFormatter,
    url: &str,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let spinner = formatter.spinner("Resolving media info...");
    let result = downloader.info(url).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        formatter.print_json(&result)?;
    }
    match &result {
        Outcome::Success(media) => {
            if !json {
                formatter.print_media_info(media);
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failure(failure) => {
            if !json {
                formatter.print_failure(failure);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Handle single download
async fn handle_download(
    downloader: &Downloader,
    formatter: &OutputFormatter,
    request: &DownloadRequest,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let start_time = Instant::now();
    let destination = request
        .destination_dir
        .as_deref()
        .unwrap_or_else(|| downloader.default_download_dir());

    if !json {
        formatter.print_download_start(&request.url, destination);
    }
    info!("Starting download for URL: {}", request.url);

    let spinner = formatter.spinner("Downloading...");
    let result = downloader.download(request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        formatter.print_json(&result)?;
    }
    match &result {
        Outcome::Success(saved) => {
            if !json {
                formatter.print_download_complete(saved, start_time.elapsed());
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Failure(failure) => {
            if !json {
                formatter.print_failure(failure);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) -> anyhow::Result<()> {
    let default_level = match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "info",
        VerbosityLevel::Verbose => "debug",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
