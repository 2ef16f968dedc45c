//! Fire-and-forget JSON snapshot persistence.
//!
//! A [`Snapshotter`] binds one store to one named document in a
//! [`SnapshotStore`]. After every mutation the store hands it the current
//! collection; the snapshotter encodes `{ "<collection-field>": [...] }` and
//! spawns the write. The mutating action never awaits the write and never
//! observes its failure — in-memory state stays authoritative for the
//! session, and a failed write only means the state will not survive a
//! restart.
//!
//! Hydration is the inverse, run once at store construction: an absent or
//! corrupt document yields an empty collection and a warning, never an error.

use crate::health::HealthCheck;
use courtside_core::snapshot::SnapshotStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Keyed, fire-and-forget persistence for one store's collection.
///
/// Cheap to clone; clones share the backend, the health flag, and the write
/// ordering for their key.
///
/// # Example
///
/// ```ignore
/// let snapshotter = Snapshotter::new(backend, "enrollment-storage", "students");
/// let store = StoreBuilder::new("students", env)
///     .with_snapshotter(snapshotter)
///     .hydrate()
///     .await;
/// ```
#[derive(Clone)]
pub struct Snapshotter {
    backend: Arc<dyn SnapshotStore>,
    key: String,
    collection_field: String,
    last_write_ok: Arc<AtomicBool>,
    seq: Arc<AtomicU64>,
    // Holds the highest sequence number that reached the backend; the lock is
    // held across each save so writes for this key apply in mutation order.
    landed: Arc<tokio::sync::Mutex<u64>>,
}

impl Snapshotter {
    /// Creates a snapshotter writing under `key`, with the collection stored
    /// beneath `collection_field` in the document.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SnapshotStore>,
        key: impl Into<String>,
        collection_field: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            key: key.into(),
            collection_field: collection_field.into(),
            last_write_ok: Arc::new(AtomicBool::new(true)),
            seq: Arc::new(AtomicU64::new(0)),
            landed: Arc::new(tokio::sync::Mutex::new(0)),
        }
    }

    /// The document key this snapshotter writes under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads and decodes the persisted collection.
    ///
    /// Absence, I/O failure, and corrupt documents all yield an empty
    /// collection; the latter two are logged at `warn`. The caller never
    /// sees an error.
    pub async fn hydrate<E: DeserializeOwned>(&self) -> Vec<E> {
        match self.backend.load(&self.key).await {
            Ok(Some(body)) => match Self::decode(&self.collection_field, &body) {
                Ok(entities) => entities,
                Err(error) => {
                    metrics::counter!("snapshot.hydrate.corrupt", "key" => self.key.clone())
                        .increment(1);
                    tracing::warn!(
                        key = %self.key,
                        error = %error,
                        "persisted snapshot is corrupt; starting empty"
                    );
                    Vec::new()
                },
            },
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!(
                    key = %self.key,
                    error = %error,
                    "failed to load snapshot; starting empty"
                );
                Vec::new()
            },
        }
    }

    /// Encodes the collection and spawns the write. Fire-and-forget: the
    /// result is reflected only in [`health`](Self::health), logs, and
    /// metrics.
    ///
    /// Writes for this key land in mutation order. Each body carries a
    /// sequence number and a body overtaken by a newer one is dropped
    /// instead of written, so the document on disk is never older than the
    /// last mutation that reached the backend.
    ///
    /// # Panics
    ///
    /// The spawned write requires a running tokio runtime; store mutations
    /// are always async, so one is present.
    pub fn persist<E: Serialize>(&self, entities: &[E]) {
        let body = match Self::encode(&self.collection_field, entities) {
            Ok(body) => body,
            Err(error) => {
                self.last_write_ok.store(false, Ordering::Release);
                metrics::counter!("snapshot.write.failed", "key" => self.key.clone()).increment(1);
                tracing::warn!(key = %self.key, error = %error, "failed to encode snapshot");
                return;
            },
        };

        // Callers persist under the store's write lock, so sequence numbers
        // follow mutation order.
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let backend = Arc::clone(&self.backend);
        let key = self.key.clone();
        let last_write_ok = Arc::clone(&self.last_write_ok);
        let landed = Arc::clone(&self.landed);
        tokio::spawn(async move {
            let mut newest = landed.lock().await;
            if seq < *newest {
                metrics::counter!("snapshot.write.stale", "key" => key.clone()).increment(1);
                tracing::debug!(key = %key, "newer snapshot already written; dropping this body");
                return;
            }
            match backend.save(&key, body).await {
                Ok(()) => {
                    *newest = seq;
                    last_write_ok.store(true, Ordering::Release);
                    metrics::counter!("snapshot.write.ok", "key" => key.clone()).increment(1);
                },
                Err(error) => {
                    last_write_ok.store(false, Ordering::Release);
                    metrics::counter!("snapshot.write.failed", "key" => key.clone()).increment(1);
                    tracing::warn!(
                        key = %key,
                        error = %error,
                        "snapshot write failed; in-memory state unaffected"
                    );
                },
            }
        });
    }

    /// Reports the outcome of the most recent snapshot write.
    #[must_use]
    pub fn health(&self, component: &str) -> HealthCheck {
        let check = if self.last_write_ok.load(Ordering::Acquire) {
            HealthCheck::healthy(component)
        } else {
            HealthCheck::degraded(
                component,
                "last snapshot write failed; state will not survive a restart",
            )
        };
        check.with_metadata("snapshot_key", self.key.clone())
    }

    fn encode<E: Serialize>(field: &str, entities: &[E]) -> Result<String, serde_json::Error> {
        let mut document = serde_json::Map::new();
        document.insert(field.to_string(), serde_json::to_value(entities)?);
        serde_json::to_string(&serde_json::Value::Object(document))
    }

    fn decode<E: DeserializeOwned>(field: &str, body: &str) -> Result<Vec<E>, serde_json::Error> {
        let document: serde_json::Value = serde_json::from_str(body)?;
        match document.get(field) {
            Some(entities) => serde_json::from_value(entities.clone()),
            // A document without the collection field is an empty collection.
            None => Ok(Vec::new()),
        }
    }
}

impl std::fmt::Debug for Snapshotter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshotter")
            .field("key", &self.key)
            .field("collection_field", &self.collection_field)
            .field("last_write_ok", &self.last_write_ok.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use courtside_core::snapshot::SnapshotError;
    use courtside_testing::mocks::MemorySnapshotStore;
    use futures::future::BoxFuture;
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        label: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: "r1".to_string(),
                label: "one".to_string(),
            },
            Row {
                id: "r2".to_string(),
                label: "two".to_string(),
            },
        ]
    }

    async fn settle() {
        // Spawned writes land on the same runtime; yield until they do.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn persist_then_hydrate_round_trips() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let snapshotter = Snapshotter::new(backend, "rows-storage", "rows");

        snapshotter.persist(&rows());
        settle().await;

        let hydrated: Vec<Row> = snapshotter.hydrate().await;
        assert_eq!(hydrated, rows());
        assert!(snapshotter.health("rows").status.is_healthy());
    }

    #[tokio::test]
    async fn document_shape_nests_collection_under_field() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let snapshotter = Snapshotter::new(backend.clone(), "rows-storage", "rows");

        snapshotter.persist(&rows());
        settle().await;

        let body = backend.stored("rows-storage").unwrap();
        let document: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(document.get("rows").unwrap().is_array());
        assert_eq!(document["rows"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn slow_write_never_clobbers_a_newer_snapshot() {
        // Backend whose first save stalls, so a naive spawn-per-write would
        // let the older body finish last and survive as the document.
        struct SlowFirstStore {
            inner: MemorySnapshotStore,
            delay_next: AtomicBool,
        }

        impl SnapshotStore for SlowFirstStore {
            fn load(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, SnapshotError>> {
                self.inner.load(key)
            }

            fn save<'a>(
                &'a self,
                key: &'a str,
                body: String,
            ) -> BoxFuture<'a, Result<(), SnapshotError>> {
                Box::pin(async move {
                    if self.delay_next.swap(false, Ordering::SeqCst) {
                        tokio::time::sleep(Duration::from_millis(40)).await;
                    }
                    self.inner.save(key, body).await
                })
            }
        }

        let backend = Arc::new(SlowFirstStore {
            inner: MemorySnapshotStore::new(),
            delay_next: AtomicBool::new(true),
        });
        let snapshotter = Snapshotter::new(backend.clone(), "rows-storage", "rows");

        snapshotter.persist(&rows()[..1]);
        snapshotter.persist(&rows());
        tokio::time::sleep(Duration::from_millis(100)).await;

        let hydrated: Vec<Row> = snapshotter.hydrate().await;
        assert_eq!(hydrated, rows());
        assert!(snapshotter.health("rows").status.is_healthy());
    }

    #[tokio::test]
    async fn absent_snapshot_hydrates_empty() {
        let backend = Arc::new(MemorySnapshotStore::new());
        let snapshotter = Snapshotter::new(backend, "rows-storage", "rows");

        let hydrated: Vec<Row> = snapshotter.hydrate().await;
        assert!(hydrated.is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_hydrates_empty() {
        let backend = Arc::new(MemorySnapshotStore::new());
        backend.seed("rows-storage", "{not json");
        let snapshotter = Snapshotter::new(backend, "rows-storage", "rows");

        let hydrated: Vec<Row> = snapshotter.hydrate().await;
        assert!(hydrated.is_empty());
    }

    #[tokio::test]
    async fn write_failure_degrades_health_but_is_swallowed() {
        struct FailingStore;

        impl SnapshotStore for FailingStore {
            fn load(&self, _key: &str) -> BoxFuture<'_, Result<Option<String>, SnapshotError>> {
                Box::pin(async { Ok(None) })
            }

            fn save<'a>(
                &'a self,
                key: &'a str,
                _body: String,
            ) -> BoxFuture<'a, Result<(), SnapshotError>> {
                Box::pin(async move {
                    Err(SnapshotError::Io {
                        key: key.to_string(),
                        reason: "disk full".to_string(),
                    })
                })
            }
        }

        let snapshotter = Snapshotter::new(Arc::new(FailingStore), "rows-storage", "rows");
        snapshotter.persist(&rows());
        settle().await;

        let check = snapshotter.health("rows");
        assert!(check.status.is_degraded());
    }
}
