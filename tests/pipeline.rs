use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use vidgrab::download::RetryConfigBuilder;
use vidgrab::engine::{CacheControl, ExtractionEngine, FetchOptions, ProbeDepth, RawInfo};
use vidgrab::{Config, DownloadRequest, Downloader, ErrorKind, VidgrabError};

const URL: &str = "https://media.example.org/watch/42";

/// Serves one metadata document from JSON and fails the first `forbidden` fetches
struct JsonEngine {
    document: serde_json::Value,
    forbidden: AtomicU32,
    fetches: AtomicU32,
}

impl JsonEngine {
    fn new(document: serde_json::Value, forbidden: u32) -> Self {
        Self {
            document,
            forbidden: AtomicU32::new(forbidden),
            fetches: AtomicU32::new(0),
        }
    }

    fn info(&self) -> vidgrab::Result<Option<RawInfo>> {
        Ok(Some(serde_json::from_value(self.document.clone())?))
    }
}

#[async_trait]
impl ExtractionEngine for JsonEngine {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn probe(&self, _url: &str, _depth: ProbeDepth) -> vidgrab::Result<Option<RawInfo>> {
        self.info()
    }

    async fn fetch(&self, _url: &str, options: &FetchOptions) -> vidgrab::Result<Option<RawInfo>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self
            .forbidden
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(VidgrabError::from_engine_output(
                "ERROR: [generic] 42: HTTP Error 403: Forbidden",
            ));
        }

        let scratch = Path::new(&options.output_template).parent().unwrap();
        std::fs::write(scratch.join("Night Drive.mp4"), b"video").unwrap();
        self.info()
    }
}

struct DirCache(PathBuf);

#[async_trait]
impl CacheControl for DirCache {
    fn location(&self) -> PathBuf {
        self.0.clone()
    }

    async fn clear(&self) -> vidgrab::Result<()> {
        Ok(())
    }
}

fn document() -> serde_json::Value {
    json!({
        "_type": "video",
        "title": "Night Drive",
        "duration": 184.4,
        "thumbnail": "https://media.example.org/42.jpg",
        "webpage_url": URL,
        "extractor": "generic",
        "extractor_key": "Generic",
        "formats": [
            {"format_id": "hls-360", "ext": "mp4", "resolution": "640x360",
             "filesize": null, "vcodec": "avc1.4d401e", "acodec": "mp4a.40.2"},
            {"format_id": "audio", "ext": "m4a", "resolution": "audio only",
             "filesize": 900000, "vcodec": "none", "acodec": "mp4a.40.2"},
            {"format_id": "http-720", "ext": "mp4", "resolution": "1280x720",
             "filesize": 3145728, "vcodec": "avc1.64001f", "acodec": "mp4a.40.2"}
        ]
    })
}

fn downloader(root: &Path, engine: Arc<JsonEngine>) -> Downloader {
    let config = Config::default()
        .with_download_dir(root.join("downloads"))
        .with_scratch_root(root.join("scratch"))
        .with_retry(RetryConfigBuilder::new().max_attempts(2).build());
    Downloader::with_engine(config, engine, Arc::new(DirCache(root.join("cache"))))
}

#[tokio::test]
async fn info_serializes_with_wire_names() {
    let root = tempfile::tempdir().unwrap();
    let engine = Arc::new(JsonEngine::new(document(), 0));
    let downloader = downloader(root.path(), engine);

    let outcome = downloader.info(URL).await;
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["title"], "Night Drive");
    assert_eq!(value["duration"], 184);
    assert_eq!(value["extractor_key"], "Generic");
    let formats = value["formats"].as_array().unwrap();
    assert_eq!(formats.len(), 2);
    assert_eq!(formats[0]["format_id"], "http-720");
    assert_eq!(formats[0]["description"], "1280x720 (mp4) - 3.0 MB");
    assert_eq!(formats[1]["format_id"], "hls-360");
    assert_eq!(formats[1]["filesize"], serde_json::Value::Null);
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn download_serializes_success_payload() {
    let root = tempfile::tempdir().unwrap();
    let engine = Arc::new(JsonEngine::new(document(), 1));
    let downloader = downloader(root.path(), engine.clone());

    let outcome = downloader
        .download(&DownloadRequest::new(URL).with_variant("http-720"))
        .await;
    let value = serde_json::to_value(&outcome).unwrap();

    let expected = root.path().join("downloads").join("Night Drive.mp4");
    assert_eq!(
        value,
        json!({
            "success": true,
            "filename": "Night Drive.mp4",
            "path": expected.to_string_lossy(),
        })
    );
    assert_eq!(engine.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn download_failure_keeps_engine_message() {
    let root = tempfile::tempdir().unwrap();
    let engine = Arc::new(JsonEngine::new(document(), 2));
    let downloader = downloader(root.path(), engine.clone());

    let outcome = downloader.download(&DownloadRequest::new(URL)).await;
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::TransientNetwork);

    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        value,
        json!({ "error": "ERROR: [generic] 42: HTTP Error 403: Forbidden" })
    );
    assert_eq!(engine.fetches.load(Ordering::SeqCst), 2);
}
