//! On-disk snapshot of the article cache.
//!
//! The snapshot is a single JSON object mapping article id to article record.
//! It is a warm cache only: a missing or unreadable file loads as empty, and
//! a failed save just means the next session starts cold. Listing pages are
//! never written here.

use crate::api::Article;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_SNAPSHOT_FILE: &str = ".tn-cli-articles-cache.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct DiskSnapshot {
    path: PathBuf,
}

impl DiskSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every article to disk, replacing the previous snapshot.
    ///
    /// Returns the number of articles written.
    pub fn save<'a, I>(&self, articles: I) -> Result<usize, SnapshotError>
    where
        I: IntoIterator<Item = (&'a str, &'a Article)>,
    {
        // BTreeMap keeps the file stable across saves of the same cache
        let map: BTreeMap<&str, &Article> = articles.into_iter().collect();
        let json = serde_json::to_vec(&map)?;
        atomic_write(&self.path, &json)?;

        tracing::info!(
            path = %self.path.display(),
            articles = map.len(),
            bytes = json.len(),
            "Saved article snapshot"
        );
        Ok(map.len())
    }

    /// Read the snapshot back. Never fails: problems yield an empty map.
    pub fn load(&self) -> HashMap<String, Article> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No article snapshot found");
                return HashMap::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read article snapshot, starting cold"
                );
                return HashMap::new();
            }
        };

        match serde_json::from_slice::<HashMap<String, Article>>(&bytes) {
            Ok(articles) => {
                tracing::info!(
                    path = %self.path.display(),
                    articles = articles.len(),
                    "Loaded article snapshot"
                );
                articles
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Article snapshot is corrupt, ignoring it"
                );
                HashMap::new()
            }
        }
    }

    /// Delete the snapshot. A missing file counts as success.
    pub fn clear(&self) -> Result<(), SnapshotError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Deleted article snapshot");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write `content` to `dst` via a temp file and rename, so a crash never
/// leaves a truncated snapshot behind.
fn atomic_write(dst: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Unpredictable temp name; create_new refuses to follow a planted file
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let result = (|| {
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(content)?;
        temp_file.sync_all()?;
        drop(temp_file);

        // On Windows, rename fails if destination exists, so remove it first
        #[cfg(windows)]
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }

        std::fs::rename(&temp_path, dst)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
