//! File-backed snapshot storage for Courtside.
//!
//! This crate provides [`FileSnapshotStore`], a [`SnapshotStore`] backend that
//! keeps one JSON document per storage key on the local filesystem. It is the
//! production counterpart of the in-memory backend used in tests: each key maps
//! to a `<key>.json` file under a base directory, reads of absent keys report
//! an empty collection, and writes replace the whole document.
//!
//! # Example
//!
//! ```ignore
//! use courtside_persistence::FileSnapshotStore;
//!
//! let backend = FileSnapshotStore::new("/var/lib/courtside");
//! let body = backend.load("venues-storage").await?;
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;

use courtside_core::snapshot::{SnapshotError, SnapshotStore};

/// Snapshot backend storing one JSON file per storage key.
///
/// Keys are used verbatim as file stems, so callers should stick to
/// filesystem-safe names (`venues-storage`, `students-storage`, ...). The
/// base directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base: Arc<PathBuf>,
}

impl FileSnapshotStore {
    /// Create a backend rooted at the given directory
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Arc::new(base.into()),
        }
    }

    /// Directory this backend reads and writes under
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    #[tracing::instrument(skip_all, fields(key = %key))]
    fn load(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, SnapshotError>> {
        let path = self.path_for(key);
        let key = key.to_owned();
        Box::pin(async move {
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => {
                    metrics::counter!("snapshot.file.read", "key" => key).increment(1);
                    Ok(Some(body))
                }
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(SnapshotError::Io {
                    key,
                    reason: err.to_string(),
                }),
            }
        })
    }

    #[tracing::instrument(skip_all, fields(key = %key, bytes = body.len()))]
    fn save<'a>(&'a self, key: &'a str, body: String) -> BoxFuture<'a, Result<(), SnapshotError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let io = |err: std::io::Error| SnapshotError::Io {
                key: key.to_owned(),
                reason: err.to_string(),
            };

            tokio::fs::create_dir_all(self.base.as_ref())
                .await
                .map_err(io)?;

            // Write-then-rename so a crash mid-write never leaves a torn
            // document behind.
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, body.as_bytes()).await.map_err(io)?;
            tokio::fs::rename(&tmp, &path).await.map_err(io)?;

            metrics::counter!("snapshot.file.write", "key" => key.to_owned()).increment(1);
            Ok(())
        })
    }
}
