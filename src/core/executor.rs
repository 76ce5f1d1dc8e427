//! Fetch into scratch space, then relocate into the destination directory

use crate::config::Config;
use crate::core::media_info::{DownloadRequest, DownloadResult, SavedFile};
use crate::download::TransientRetrier;
use crate::engine::{ExtractionEngine, FetchOptions, ProbeDepth};
use crate::error::VidgrabError;
use crate::utils::{reserve_unique_path, sanitize_filename, validate_media_url};
use crate::Result;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tempfile::TempDir;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Which file in the scratch directory counts as the download result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPolicy {
    /// First file by name
    FirstFound,
    /// Most recently modified file
    Newest,
    /// Largest file
    Largest,
    /// First file with this extension, else the largest file
    PreferExtension(String),
}

impl Default for ArtifactPolicy {
    fn default() -> Self {
        ArtifactPolicy::for_container("mp4")
    }
}

impl ArtifactPolicy {
    /// Prefer files in the merge container
    pub fn for_container(container: &str) -> Self {
        ArtifactPolicy::PreferExtension(container.trim_start_matches('.').to_string())
    }

    /// Pick one artifact out of `candidates`
    pub fn select(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        match self {
            ArtifactPolicy::FirstFound => candidates.first().cloned(),
            ArtifactPolicy::Newest => candidates
                .iter()
                .max_by_key(|p| {
                    fs::metadata(p)
                        .and_then(|m| m.modified())
                        .unwrap_or(SystemTime::UNIX_EPOCH)
                })
                .cloned(),
            ArtifactPolicy::Largest => candidates
                .iter()
                .max_by_key(|p| fs::metadata(p).map(|m| m.len()).unwrap_or(0))
                .cloned(),
            ArtifactPolicy::PreferExtension(ext) => candidates
                .iter()
                .find(|p| {
                    p.extension()
                        .is_some_and(|e| e.eq_ignore_ascii_case(ext.as_str()))
                })
                .cloned()
                .or_else(|| ArtifactPolicy::Largest.select(candidates)),
        }
    }
}

impl fmt::Display for ArtifactPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactPolicy::FirstFound => write!(f, "first"),
            ArtifactPolicy::Newest => write!(f, "newest"),
            ArtifactPolicy::Largest => write!(f, "largest"),
            ArtifactPolicy::PreferExtension(ext) => write!(f, "ext:{}", ext),
        }
    }
}

impl FromStr for ArtifactPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(ArtifactPolicy::FirstFound),
            "newest" => Ok(ArtifactPolicy::Newest),
            "largest" => Ok(ArtifactPolicy::Largest),
            other => match other.strip_prefix("ext:") {
                Some(ext) if !ext.is_empty() => {
                    Ok(ArtifactPolicy::PreferExtension(ext.trim_start_matches('.').to_string()))
                }
                _ => Err(format!(
                    "unknown artifact policy '{}' (expected first, newest, largest or ext:<ext>)",
                    s
                )),
            },
        }
    }
}

/// Files directly in `scratch`, or one level down when there are none.
/// Sorted by path so selection does not depend on directory order.
pub fn find_artifacts(scratch: &Path) -> Vec<PathBuf> {
    let collect = |depth: usize| -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(scratch)
            .min_depth(depth)
            .max_depth(depth)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort();
        files
    };

    let files = collect(1);
    if !files.is_empty() {
        return files;
    }
    collect(2)
}

/// Move `artifact` into `destination` under its sanitized, collision-free name
pub fn relocate(artifact: &Path, destination: &Path) -> Result<SavedFile> {
    let original = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    // Names left with no stem ("", ".mp4") get a placeholder one
    let mut filename = sanitize_filename(&original);
    let stem = filename.rfind('.').map_or(filename.as_str(), |idx| &filename[..idx]);
    if stem.trim_matches('.').is_empty() {
        filename = format!("download{}", filename);
    }

    let target = reserve_unique_path(destination, &filename).map_err(|e| {
        VidgrabError::Filesystem(format!(
            "Could not reserve a name for {} in {}: {}",
            filename,
            destination.display(),
            e
        ))
    })?;

    if let Err(rename_err) = fs::rename(artifact, &target) {
        debug!(
            "Rename into {} failed ({}), staging a copy instead",
            destination.display(),
            rename_err
        );
        if let Err(e) = copy_then_rename(artifact, &target, destination) {
            let _ = fs::remove_file(&target);
            return Err(VidgrabError::Filesystem(format!(
                "Could not move {} to {}: {}",
                artifact.display(),
                target.display(),
                e
            )));
        }
    }

    let filename = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(filename);

    Ok(SavedFile {
        filename,
        path: target,
    })
}

/// Cross-filesystem move: copy to a hidden file next to `target`, then rename over it
fn copy_then_rename(artifact: &Path, target: &Path, destination: &Path) -> std::io::Result<()> {
    let mut staging = tempfile::Builder::new()
        .prefix(".vidgrab-")
        .suffix(".part")
        .tempfile_in(destination)?;
    let mut source = fs::File::open(artifact)?;
    std::io::copy(&mut source, staging.as_file_mut())?;
    staging.as_file().sync_all()?;
    staging.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Downloads one item per request into the destination directory
pub struct DownloadExecutor {
    engine: Arc<dyn ExtractionEngine>,
    retrier: Arc<TransientRetrier>,
    default_dir: PathBuf,
    scratch_root: Option<PathBuf>,
    container: String,
    policy: ArtifactPolicy,
}

impl DownloadExecutor {
    /// Create a new executor
    pub fn new(
        engine: Arc<dyn ExtractionEngine>,
        retrier: Arc<TransientRetrier>,
        config: &Config,
    ) -> Self {
        Self {
            engine,
            retrier,
            default_dir: config.default_download_dir.clone(),
            scratch_root: config.scratch_root.clone(),
            container: config.container.clone(),
            policy: config.artifact_policy.clone(),
        }
    }

    /// Run a download; every failure comes back as a marked message
    pub async fn execute(&self, request: &DownloadRequest) -> DownloadResult {
        let result = self.try_execute(request).await;
        match &result {
            Ok(saved) => info!("Saved {}", saved.path.display()),
            Err(e) => error!("Final error in download: {}", e.user_message()),
        }
        result.into()
    }

    /// Run a download, keeping the typed error
    pub async fn try_execute(&self, request: &DownloadRequest) -> Result<SavedFile> {
        let url = validate_media_url(&request.url)?;
        let url = url.as_str();
        let variant = request.variant_id.as_deref().filter(|v| !v.trim().is_empty());
        let destination = self
            .prepare_destination(request.destination_dir.as_deref())
            .await?;
        let destination = destination.as_path();

        info!(
            "Downloading {} (format {}) into {}",
            url,
            variant.unwrap_or("best"),
            destination.display()
        );

        self.retrier
            .run(|| self.attempt(url, variant, destination))
            .await
    }

    async fn prepare_destination(&self, requested: Option<&Path>) -> Result<PathBuf> {
        let dir = requested
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_dir.clone());

        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            VidgrabError::Filesystem(format!("Could not create {}: {}", dir.display(), e))
        })?;
        Ok(dir)
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("vidgrab-");
        let dir = match &self.scratch_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// One attempt; the scratch directory is removed when it goes out of scope
    async fn attempt(
        &self,
        url: &str,
        variant: Option<&str>,
        destination: &Path,
    ) -> Result<SavedFile> {
        let scratch = self.scratch_dir()?;
        let mut options = FetchOptions::into_dir(scratch.path(), variant, &self.container);

        let info = self
            .engine
            .probe(url, ProbeDepth::Full)
            .await?
            .ok_or_else(|| {
                VidgrabError::Resolution("Could not retrieve video information".to_string())
            })?;
        if info.is_collection() {
            options.first_item_only = true;
        }
        let item = info.into_representative()?;
        debug!("Fetching {:?} into {}", item.title(), scratch.path().display());

        self.engine
            .fetch(url, &options)
            .await?
            .ok_or_else(|| {
                VidgrabError::Download("Download failed - no information returned".to_string())
            })?;

        let artifacts = find_artifacts(scratch.path());
        debug!("Scratch artifacts: {:?}", artifacts);
        let artifact = self.policy.select(&artifacts).ok_or_else(|| {
            VidgrabError::Filesystem(format!(
                "No files found in {} or its subdirectories",
                scratch.path().display()
            ))
        })?;

        let destination = destination.to_path_buf();
        tokio::task::spawn_blocking(move || relocate(&artifact, &destination))
            .await
            .map_err(|e| VidgrabError::Filesystem(format!("Relocation task failed: {}", e)))?
    }
}
