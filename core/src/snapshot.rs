//! Snapshot store trait for keyed JSON document persistence.
//!
//! A subset of stores persist their collection to on-device key-value storage
//! after every mutation and rehydrate it once at startup. The storage itself
//! is abstracted here; implementations live in sibling crates:
//!
//! - `FileSnapshotStore` (in `courtside-persistence`): one `<key>.json` file
//!   per named key under a base directory
//! - `MemorySnapshotStore` (in `courtside-testing`): in-memory map that
//!   records writes for assertions
//!
//! # Durability posture
//!
//! Writes are fire-and-forget from the store action's perspective: a failed
//! write is logged and reflected in the store's health signal, and the
//! in-memory state stays authoritative for the current session. There is no
//! write-ahead log and no fsync discipline by design.

use futures::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur during snapshot store operations.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Underlying storage I/O failed.
    #[error("Snapshot I/O error for key '{key}': {reason}")]
    Io {
        /// The document key involved.
        key: String,
        /// The underlying failure.
        reason: String,
    },

    /// A previously stored document could not be parsed.
    ///
    /// Hydration treats this as "no document": the collection starts empty
    /// and the error never reaches the store's caller.
    #[error("Snapshot for key '{key}' is corrupt: {reason}")]
    Corrupt {
        /// The document key involved.
        key: String,
        /// The parse failure.
        reason: String,
    },
}

/// Keyed JSON document storage.
///
/// One document per named key; the document body is an opaque JSON string to
/// this trait (the runtime's snapshotter owns the `{ "<collection>": [...] }`
/// shape).
///
/// # Dyn Compatibility
///
/// Explicit [`BoxFuture`] returns so stores can hold
/// `Arc<dyn SnapshotStore>`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; writes may be issued from spawned
/// tasks.
pub trait SnapshotStore: Send + Sync {
    /// Loads the document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the backing storage failed in a way
    /// that is not simply "absent". Absence is `Ok(None)`.
    fn load(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, SnapshotError>>;

    /// Stores `body` under `key`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if the write failed. Callers in the
    /// runtime swallow this after logging; in-memory state is unaffected.
    fn save<'a>(&'a self, key: &'a str, body: String)
    -> BoxFuture<'a, Result<(), SnapshotError>>;
}
