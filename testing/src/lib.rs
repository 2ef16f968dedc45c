//! # Courtside Testing
//!
//! Testing utilities and mocks for the Courtside domain-store architecture.
//!
//! This crate provides:
//! - Deterministic clocks (fixed and stepping)
//! - Predictable id generation
//! - An in-memory snapshot backend with inspection helpers
//! - A ready-made [`StoreEnvironment`](courtside_core::environment::StoreEnvironment)
//!   wiring for tests
//!
//! ## Example
//!
//! ```ignore
//! use courtside_testing::mocks::test_environment;
//! use courtside_runtime::StoreBuilder;
//!
//! #[tokio::test]
//! async fn venue_creation() {
//!     let store = StoreBuilder::<Venue>::new("venues", test_environment()).build();
//!     let venue = store.create(|id, stamps| Venue::new(id, stamps, "Center Court")).await;
//!     assert_eq!(store.len().await, 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use courtside_core::entity::EntityId;
use courtside_core::environment::{Clock, StoreEnvironment};
use courtside_core::ident::IdGenerator;
use courtside_core::snapshot::{SnapshotError, SnapshotStore};

/// Mock implementations for testing.
pub mod mocks {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    use chrono::TimeDelta;
    use futures::future::BoxFuture;

    use super::{
        Clock, DateTime, EntityId, IdGenerator, SnapshotError, SnapshotStore, StoreEnvironment,
        Utc,
    };

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use courtside_testing::mocks::FixedClock;
    /// use courtside_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances one second every time it is read
    ///
    /// Useful when a test needs `updated_at` to move strictly past
    /// `created_at` without sleeping.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        ticks: AtomicU64,
    }

    impl SteppingClock {
        /// Create a stepping clock starting at the given time
        #[must_use]
        pub const fn new(start: DateTime<Utc>) -> Self {
            Self {
                start,
                ticks: AtomicU64::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
            self.start + TimeDelta::seconds(i64::try_from(tick).unwrap_or(i64::MAX))
        }
    }

    /// Id generator producing readable sequential ids (`test-1`, `test-2`, ...)
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        counter: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator with the given id prefix
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: AtomicU64::new(0),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new("test")
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn generate(&self) -> EntityId {
            let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
            EntityId::from_string(format!("{}-{n}", self.prefix))
        }
    }

    /// In-memory snapshot backend
    ///
    /// Stores documents in a map keyed by storage key. The [`seed`](Self::seed)
    /// and [`stored`](Self::stored) helpers let tests plant pre-existing
    /// documents and inspect what was written.
    #[derive(Debug, Default)]
    pub struct MemorySnapshotStore {
        documents: Mutex<HashMap<String, String>>,
    }

    impl MemorySnapshotStore {
        /// Create an empty in-memory backend
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Plant a document under the given key before the store hydrates
        pub fn seed(&self, key: impl Into<String>, body: impl Into<String>) {
            self.documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.into(), body.into());
        }

        /// Return the document currently stored under the given key
        #[must_use]
        pub fn stored(&self, key: &str) -> Option<String> {
            self.documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned()
        }
    }

    impl SnapshotStore for MemorySnapshotStore {
        fn load(&self, key: &str) -> BoxFuture<'_, Result<Option<String>, SnapshotError>> {
            let body = self.stored(key);
            Box::pin(async move { Ok(body) })
        }

        fn save<'a>(
            &'a self,
            key: &'a str,
            body: String,
        ) -> BoxFuture<'a, Result<(), SnapshotError>> {
            self.documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_owned(), body);
            Box::pin(async { Ok(()) })
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// Create a default test environment
    ///
    /// Wires a [`SteppingClock`] (so timestamps advance between calls) and a
    /// [`SequentialIdGenerator`] with the `test` prefix.
    #[must_use]
    pub fn test_environment() -> StoreEnvironment {
        StoreEnvironment::new(
            Arc::new(SteppingClock::new(test_epoch())),
            Arc::new(SequentialIdGenerator::default()),
        )
    }

    #[allow(clippy::expect_used)]
    fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }
}

// Re-export commonly used items
pub use mocks::{
    FixedClock, MemorySnapshotStore, SequentialIdGenerator, SteppingClock, test_clock,
    test_environment,
};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn fixed_clock_never_moves() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn stepping_clock_advances_each_read() {
        let clock = SteppingClock::new(test_clock().now());
        let first = clock.now();
        let second = clock.now();
        assert!(second > first);
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIdGenerator::new("court");
        assert_eq!(ids.generate().as_str(), "court-1");
        assert_eq!(ids.generate().as_str(), "court-2");
    }

    #[tokio::test]
    async fn memory_backend_round_trips() {
        let backend = MemorySnapshotStore::new();
        assert!(backend.load("venues-storage").await.unwrap().is_none());

        backend
            .save("venues-storage", "{\"venues\":[]}".to_owned())
            .await
            .unwrap();
        assert_eq!(
            backend.stored("venues-storage").as_deref(),
            Some("{\"venues\":[]}")
        );
    }
}
