//! HTTP surface over the downloader

use crate::core::{DownloadRequest, Downloader, Failure};
use crate::error::ErrorKind;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
struct InfoRequest {
    #[serde(default)]
    url: String,
}

fn url_required() -> Json<Value> {
    Json(json!({ "error": "URL is required" }))
}

fn to_json<T: serde::Serialize>(value: &T) -> Json<Value> {
    match serde_json::to_value(value) {
        Ok(value) => Json(value),
        Err(e) => {
            let failure = Failure::new(ErrorKind::Engine, &e.to_string());
            Json(json!({ "error": failure.error }))
        }
    }
}

async fn media_info(
    State(downloader): State<Arc<Downloader>>,
    Json(payload): Json<InfoRequest>,
) -> Json<Value> {
    if payload.url.trim().is_empty() {
        return url_required();
    }
    to_json(&downloader.info(&payload.url).await)
}

async fn download(
    State(downloader): State<Arc<Downloader>>,
    Json(payload): Json<DownloadRequest>,
) -> Json<Value> {
    if payload.url.trim().is_empty() {
        return url_required();
    }
    to_json(&downloader.download(&payload).await)
}

async fn download_dir(State(downloader): State<Arc<Downloader>>) -> Json<Value> {
    Json(json!({ "path": downloader.default_download_dir().to_string_lossy() }))
}

/// Build the API router
pub fn router(downloader: Arc<Downloader>) -> Router {
    Router::new()
        .route("/api/info", post(media_info))
        .route("/api/download", post(download))
        .route("/api/get_download_dir", get(download_dir))
        .with_state(downloader)
}

/// Bind and serve until the process exits
pub async fn serve(downloader: Arc<Downloader>, addr: &str) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(downloader)).await?;
    Ok(())
}
