//! Integration tests for snapshot persistence across a simulated restart
//!
//! A store with a snapshotter persists after every mutation; building a fresh
//! store over the same backend and key must yield a value-equal collection.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_runtime::{DomainStore, Snapshotter, StoreBuilder};
use courtside_testing::mocks::{MemorySnapshotStore, test_environment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct ChildProfile {
    id: EntityId,
    name: String,
    age: u8,
    stamps: Stamps,
}

impl Entity for ChildProfile {
    fn id(&self) -> &EntityId {
        &self.id
    }
    fn stamps(&self) -> &Stamps {
        &self.stamps
    }
    fn stamps_mut(&mut self) -> &mut Stamps {
        &mut self.stamps
    }
}

fn profile_store(backend: Arc<MemorySnapshotStore>) -> StoreBuilder<ChildProfile> {
    StoreBuilder::new("child-profiles", test_environment()).with_snapshotter(Snapshotter::new(
        backend,
        "child-profiles-storage",
        "profiles",
    ))
}

async fn settle() {
    // Snapshot writes are spawned; give them a moment to land.
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn collection_survives_a_restart() {
    let backend = Arc::new(MemorySnapshotStore::new());

    let before = {
        let store = profile_store(Arc::clone(&backend)).build();
        store
            .create(|id, stamps| ChildProfile {
                id,
                name: "Kabir".to_string(),
                age: 9,
                stamps,
            })
            .await;
        store
            .create(|id, stamps| ChildProfile {
                id,
                name: "Sara".to_string(),
                age: 11,
                stamps,
            })
            .await;
        settle().await;
        store.list().await
        // Store dropped here: the "process" ends.
    };

    let rehydrated: DomainStore<ChildProfile> = profile_store(backend).hydrate().await;
    assert_eq!(rehydrated.list().await, before);
}

#[tokio::test]
async fn updates_and_removals_are_reflected_after_restart() {
    let backend = Arc::new(MemorySnapshotStore::new());

    let (kept_id, removed_id) = {
        let store = profile_store(Arc::clone(&backend)).build();
        let kept = store
            .create(|id, stamps| ChildProfile {
                id,
                name: "Kabir".to_string(),
                age: 9,
                stamps,
            })
            .await;
        let removed = store
            .create(|id, stamps| ChildProfile {
                id,
                name: "Sara".to_string(),
                age: 11,
                stamps,
            })
            .await;

        store.update(&kept.id, |p| p.age = 10).await.unwrap();
        store.remove(&removed.id).await.unwrap();
        settle().await;
        (kept.id, removed.id)
    };

    let rehydrated: DomainStore<ChildProfile> = profile_store(backend).hydrate().await;
    assert_eq!(rehydrated.len().await, 1);
    assert_eq!(rehydrated.get(&kept_id).await.unwrap().age, 10);
    assert!(rehydrated.get(&removed_id).await.is_none());
}

#[tokio::test]
async fn hydration_emits_no_change_events() {
    let backend = Arc::new(MemorySnapshotStore::new());
    {
        let store = profile_store(Arc::clone(&backend)).build();
        store
            .create(|id, stamps| ChildProfile {
                id,
                name: "Kabir".to_string(),
                age: 9,
                stamps,
            })
            .await;
        settle().await;
    }

    let rehydrated = profile_store(backend).hydrate().await;
    let mut rx = rehydrated.subscribe();
    assert!(rx.try_recv().is_err());
    assert_eq!(rehydrated.len().await, 1);
}
