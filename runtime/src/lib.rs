//! # Courtside Runtime
//!
//! Runtime implementation for the Courtside domain-store architecture.
//!
//! This crate provides the generic [`DomainStore`] that holds the authoritative
//! in-memory collection for one entity family, plus the machinery around it:
//!
//! - **`DomainStore`**: ordered collection + CRUD action surface + change
//!   broadcasting + inline sink delivery
//! - **Mirror**: one-directional manager→public synchronization as an
//!   [`EventSink`](courtside_core::event::EventSink)
//! - **`DraftSlot`**: staging area for multi-step creation wizards
//! - **`Snapshotter`**: fire-and-forget JSON persistence with a health signal
//!
//! ## Example
//!
//! ```ignore
//! use courtside_runtime::{InsertOrder, StoreBuilder};
//! use courtside_core::environment::StoreEnvironment;
//!
//! let store = StoreBuilder::new("venues", StoreEnvironment::production())
//!     .with_order(InsertOrder::Append)
//!     .build();
//!
//! let venue = store.create(|id, stamps| Venue { id, name: "Center Court".into(), stamps }).await;
//! assert!(store.get(venue.id()).await.is_some());
//! ```

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_core::environment::StoreEnvironment;
use courtside_core::event::{EntityEvent, EventSink};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError};
use tokio::sync::{RwLock, broadcast};

/// Draft staging area for multi-step creation wizards
pub mod draft;

/// Health status reporting for the persistence layer
pub mod health;

/// Cross-store mirroring (the manager→public synchronizer)
pub mod mirror;

/// Fire-and-forget JSON snapshot persistence
pub mod snapshotter;

pub use draft::DraftSlot;
pub use health::{HealthCheck, HealthStatus};
pub use mirror::MirrorSink;
pub use snapshotter::Snapshotter;

/// Where newly created entities land in the collection.
///
/// The ordering rule is part of a store's constructed contract, never
/// implicit: catalog-like stores append, feed-like stores (announcements,
/// photos) prepend so the newest item reads first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InsertOrder {
    /// New entities go to the end of the collection.
    #[default]
    Append,
    /// New entities go to the front of the collection (feed ordering).
    Prepend,
}

/// Builder for [`DomainStore`] instances.
///
/// Stores are constructed at the application's composition root and handed to
/// their consumers as `Arc<DomainStore<E>>`; nothing in the runtime holds a
/// global instance.
///
/// # Example
///
/// ```ignore
/// let store = StoreBuilder::new("bookings", env.clone())
///     .with_snapshotter(Snapshotter::new(backend, "demo-bookings-storage", "bookings"))
///     .hydrate()
///     .await;
/// ```
pub struct StoreBuilder<E: Entity> {
    name: String,
    env: StoreEnvironment,
    order: InsertOrder,
    snapshotter: Option<Snapshotter>,
    broadcast_capacity: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E> StoreBuilder<E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    /// Creates a builder for a store with the given name and environment.
    ///
    /// The name appears in logs, metrics labels, and health checks.
    #[must_use]
    pub fn new(name: impl Into<String>, env: StoreEnvironment) -> Self {
        Self {
            name: name.into(),
            env,
            order: InsertOrder::Append,
            snapshotter: None,
            broadcast_capacity: 16,
            _entity: PhantomData,
        }
    }

    /// Sets the insertion order for newly created entities.
    #[must_use]
    pub const fn with_order(mut self, order: InsertOrder) -> Self {
        self.order = order;
        self
    }

    /// Attaches a snapshotter; the collection is persisted after every
    /// mutation and can be rehydrated with [`StoreBuilder::hydrate`].
    #[must_use]
    pub fn with_snapshotter(mut self, snapshotter: Snapshotter) -> Self {
        self.snapshotter = Some(snapshotter);
        self
    }

    /// Sets the change-broadcast channel capacity (default 16).
    ///
    /// Increase when many slow observers subscribe.
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Builds an empty store.
    #[must_use]
    pub fn build(self) -> DomainStore<E> {
        self.build_with(Vec::new())
    }

    /// Builds a store seeded from its snapshot, if one exists.
    ///
    /// An absent or unparseable snapshot yields an empty collection; the
    /// failure is logged, never surfaced. Hydration does not emit change
    /// events.
    pub async fn hydrate(self) -> DomainStore<E> {
        let entities = match &self.snapshotter {
            Some(snapshotter) => snapshotter.hydrate::<E>().await,
            None => Vec::new(),
        };
        tracing::info!(store = %self.name, count = entities.len(), "store hydrated");
        self.build_with(entities)
    }

    fn build_with(self, entities: Vec<E>) -> DomainStore<E> {
        let (changes, _) = broadcast::channel(self.broadcast_capacity);
        DomainStore {
            name: self.name,
            env: self.env,
            order: self.order,
            entities: RwLock::new(entities),
            changes,
            sinks: std::sync::RwLock::new(Vec::new()),
            snapshotter: self.snapshotter,
        }
    }
}

/// The authoritative in-memory collection for one entity family.
///
/// # Action surface
///
/// - [`create`](Self::create) / [`insert`](Self::insert) — add entities
/// - [`update`](Self::update) / [`replace`](Self::replace) — mutate in place
/// - [`remove`](Self::remove) / [`remove_where`](Self::remove_where) — delete
/// - [`get`](Self::get) / [`query`](Self::query) / [`list`](Self::list) — read
///
/// # Semantics
///
/// - Every mutation runs to completion before the call returns: the state
///   change is applied, observers are notified, attached sinks have been
///   delivered to, and persistence has been scheduled.
/// - Mutations on a missing identifier are **silent no-ops** returning
///   `None`; the store never errors for expected conditions.
/// - The store never validates input; callers validate before acting.
/// - Identifier uniqueness is invariant: [`insert`](Self::insert) with an
///   existing id replaces in place rather than duplicating.
///
/// The store does not know about caller lifecycles: a mutation issued by an
/// abandoned caller-side flow still applies once it reaches the store.
///
/// # Concurrency
///
/// State sits behind a `tokio::sync::RwLock`; concurrent mutations serialize
/// at the write lock, so no action ever observes another's partial state.
pub struct DomainStore<E: Entity> {
    name: String,
    env: StoreEnvironment,
    order: InsertOrder,
    entities: RwLock<Vec<E>>,
    changes: broadcast::Sender<EntityEvent<E>>,
    sinks: std::sync::RwLock<Vec<Arc<dyn EventSink<E>>>>,
    snapshotter: Option<Snapshotter>,
}

impl<E> DomainStore<E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    /// The store's name, as used in logs and health checks.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The injected environment (clock + id generation).
    #[must_use]
    pub const fn env(&self) -> &StoreEnvironment {
        &self.env
    }

    /// Creates a new entity.
    ///
    /// Generates an identifier and stamps, passes them to the caller's
    /// constructor, inserts per the store's [`InsertOrder`], and returns the
    /// constructed entity. Input is never validated here.
    #[tracing::instrument(skip_all, fields(store = %self.name))]
    pub async fn create<F>(&self, build: F) -> E
    where
        F: FnOnce(EntityId, Stamps) -> E,
    {
        let id = self.env.ids.generate();
        let stamps = Stamps::at(self.env.clock.now());
        let entity = build(id, stamps);
        tracing::debug!(id = %entity.id(), "creating entity");
        self.insert(entity).await
    }

    /// Inserts a fully formed entity (mirror and seeding path).
    ///
    /// If the id is already present the existing entity is replaced in place:
    /// the uniqueness invariant wins over duplicate delivery. A replacement
    /// is observed as an update, a fresh insert as a creation.
    pub async fn insert(&self, entity: E) -> E {
        metrics::counter!("domain_store.mutations", "store" => self.name.clone(), "op" => "insert")
            .increment(1);
        let event = {
            let mut entities = self.entities.write().await;
            let replaced = match entities.iter_mut().find(|e| e.id() == entity.id()) {
                Some(slot) => {
                    *slot = entity.clone();
                    true
                },
                None => {
                    match self.order {
                        InsertOrder::Append => entities.push(entity.clone()),
                        InsertOrder::Prepend => entities.insert(0, entity.clone()),
                    }
                    false
                },
            };
            self.persist(&entities);
            if replaced {
                EntityEvent::Updated(entity.clone())
            } else {
                EntityEvent::Created(entity.clone())
            }
        };
        self.emit(event).await;
        entity
    }

    /// Applies a patch to the entity with the given id.
    ///
    /// Locates by id; **silent no-op returning `None` if absent** — callers
    /// rely on update-after-navigation races being harmless. Otherwise the
    /// patch closure mutates the entity in place, `updated_at` is refreshed,
    /// and the updated entity is returned.
    #[tracing::instrument(skip_all, fields(store = %self.name, id = %id))]
    pub async fn update<F>(&self, id: &EntityId, patch: F) -> Option<E>
    where
        F: FnOnce(&mut E),
    {
        let updated = {
            let mut entities = self.entities.write().await;
            let Some(slot) = entities.iter_mut().find(|e| e.id() == id) else {
                tracing::debug!("update on missing id is a no-op");
                metrics::counter!("domain_store.noop", "store" => self.name.clone(), "op" => "update")
                    .increment(1);
                return None;
            };
            patch(slot);
            slot.stamps_mut().touch(self.env.clock.now());
            let updated = slot.clone();
            self.persist(&entities);
            updated
        };
        metrics::counter!("domain_store.mutations", "store" => self.name.clone(), "op" => "update")
            .increment(1);
        self.emit(EntityEvent::Updated(updated.clone())).await;
        Some(updated)
    }

    /// Replaces a whole entity, matched by id (mirror path).
    ///
    /// Unlike [`update`](Self::update), the stamps on the incoming entity are
    /// kept as-is so a mirrored copy stays bit-identical to its source,
    /// `updated_at` included. Silent no-op returning `None` if the id is
    /// absent.
    pub async fn replace(&self, entity: E) -> Option<E> {
        {
            let mut entities = self.entities.write().await;
            let Some(slot) = entities.iter_mut().find(|e| e.id() == entity.id()) else {
                tracing::debug!(store = %self.name, id = %entity.id(), "replace on missing id is a no-op");
                metrics::counter!("domain_store.noop", "store" => self.name.clone(), "op" => "replace")
                    .increment(1);
                return None;
            };
            *slot = entity.clone();
            self.persist(&entities);
        }
        metrics::counter!("domain_store.mutations", "store" => self.name.clone(), "op" => "replace")
            .increment(1);
        self.emit(EntityEvent::Updated(entity.clone())).await;
        Some(entity)
    }

    /// Removes the entity with the given id.
    ///
    /// Returns the removed entity, or `None` (silent no-op) if the id is
    /// absent. There is no tombstone and no cascade: entities referencing the
    /// removed id are untouched.
    #[tracing::instrument(skip_all, fields(store = %self.name, id = %id))]
    pub async fn remove(&self, id: &EntityId) -> Option<E> {
        let removed = {
            let mut entities = self.entities.write().await;
            let Some(position) = entities.iter().position(|e| e.id() == id) else {
                tracing::debug!("remove on missing id is a no-op");
                metrics::counter!("domain_store.noop", "store" => self.name.clone(), "op" => "remove")
                    .increment(1);
                return None;
            };
            let removed = entities.remove(position);
            self.persist(&entities);
            removed
        };
        metrics::counter!("domain_store.mutations", "store" => self.name.clone(), "op" => "remove")
            .increment(1);
        self.emit(EntityEvent::Removed(removed.id().clone())).await;
        Some(removed)
    }

    /// Removes every entity matching the predicate, returning the removed
    /// entities in their collection order.
    ///
    /// This is the bulk form call sites use to clean up children before
    /// deleting a parent (the store itself never cascades).
    pub async fn remove_where<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        let removed = {
            let mut entities = self.entities.write().await;
            let mut removed = Vec::new();
            entities.retain(|e| {
                if pred(e) {
                    removed.push(e.clone());
                    false
                } else {
                    true
                }
            });
            if !removed.is_empty() {
                self.persist(&entities);
            }
            removed
        };
        metrics::counter!("domain_store.mutations", "store" => self.name.clone(), "op" => "remove_where")
            .increment(removed.len() as u64);
        for entity in &removed {
            self.emit(EntityEvent::Removed(entity.id().clone())).await;
        }
        removed
    }

    /// Returns the entity with the given id, if present. Never errors.
    pub async fn get(&self, id: &EntityId) -> Option<E> {
        let entities = self.entities.read().await;
        entities.iter().find(|e| e.id() == id).cloned()
    }

    /// Returns all entities matching the predicate, in collection order.
    ///
    /// Never mutates the collection; any re-sorting (e.g. newest-first
    /// request listings) is the caller's concern.
    pub async fn query<F>(&self, pred: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        let entities = self.entities.read().await;
        entities.iter().filter(|e| pred(e)).cloned().collect()
    }

    /// Returns the full collection in order.
    pub async fn list(&self) -> Vec<E> {
        self.entities.read().await.clone()
    }

    /// Number of entities in the collection.
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// Subscribes to change events.
    ///
    /// Observers receive a clone of every [`EntityEvent`] after the mutation
    /// is applied. A lagging observer skips old events; it never blocks the
    /// store.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent<E>> {
        self.changes.subscribe()
    }

    /// Attaches a sink that receives every event inline, within the
    /// originating mutation, in registration order.
    ///
    /// This is the manager→public synchronization seam: attach a
    /// [`MirrorSink`] pointing at the paired store. Sink errors are logged
    /// and counted; they never unwind the mutation.
    pub fn attach_sink(&self, sink: Arc<dyn EventSink<E>>) {
        self.sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
        tracing::info!(store = %self.name, "sink attached");
    }

    /// Reports the store's persistence health.
    ///
    /// A store without a snapshotter is always healthy; with one, the result
    /// reflects the outcome of the most recent snapshot write. Mutations
    /// never depend on this signal.
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        match &self.snapshotter {
            Some(snapshotter) => snapshotter.health(&self.name),
            None => HealthCheck::healthy(self.name.clone()),
        }
    }

    /// Schedules a snapshot write for the current collection, if persistence
    /// is configured. Fire-and-forget.
    fn persist(&self, entities: &[E]) {
        if let Some(snapshotter) = &self.snapshotter {
            snapshotter.persist(entities);
        }
    }

    /// Broadcasts the event to observers, then delivers it to each attached
    /// sink in registration order, awaiting each to completion.
    async fn emit(&self, event: EntityEvent<E>) {
        let _ = self.changes.send(event.clone());

        let sinks: Vec<Arc<dyn EventSink<E>>> = self
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for sink in sinks {
            match sink.apply(event.clone()).await {
                Ok(()) => {
                    metrics::counter!("domain_store.sink.delivered", "store" => self.name.clone())
                        .increment(1);
                },
                Err(error) => {
                    // No retry, no transaction: the originating mutation stands.
                    metrics::counter!("domain_store.sink.failed", "store" => self.name.clone())
                        .increment(1);
                    tracing::warn!(
                        store = %self.name,
                        kind = event.kind(),
                        id = %event.entity_id(),
                        error = %error,
                        "sink failed to apply event"
                    );
                },
            }
        }
    }
}

impl<E: Entity> std::fmt::Debug for DomainStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainStore")
            .field("name", &self.name)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap/panic

    use super::*;
    use courtside_core::entity::{Entity, EntityId, Stamps};
    use courtside_testing::mocks::test_environment;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Court {
        id: EntityId,
        label: String,
        surface: String,
        stamps: Stamps,
    }

    impl Entity for Court {
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

    fn court_store(order: InsertOrder) -> DomainStore<Court> {
        StoreBuilder::new("courts", test_environment())
            .with_order(order)
            .build()
    }

    async fn seed(store: &DomainStore<Court>, label: &str) -> Court {
        store
            .create(|id, stamps| Court {
                id,
                label: label.to_string(),
                surface: "clay".to_string(),
                stamps,
            })
            .await
    }

    #[tokio::test]
    async fn create_assigns_id_and_equal_stamps() {
        let store = court_store(InsertOrder::Append);
        let court = seed(&store, "Court 1").await;

        assert!(!court.id.as_str().is_empty());
        assert_eq!(court.stamps.created_at, court.stamps.updated_at);
        assert_eq!(store.get(&court.id).await.unwrap(), court);
    }

    #[tokio::test]
    async fn append_order_preserves_insertion_sequence() {
        let store = court_store(InsertOrder::Append);
        let a = seed(&store, "A").await;
        let b = seed(&store, "B").await;

        let labels: Vec<String> = store.list().await.into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn prepend_order_puts_newest_first() {
        let store = court_store(InsertOrder::Prepend);
        seed(&store, "old").await;
        seed(&store, "new").await;

        let labels: Vec<String> = store.list().await.into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn update_patches_and_refreshes_updated_at() {
        let store = court_store(InsertOrder::Append);
        let court = seed(&store, "Court 1").await;

        let updated = store
            .update(&court.id, |c| c.surface = "grass".to_string())
            .await
            .unwrap();

        assert_eq!(updated.id, court.id);
        assert_eq!(updated.label, "Court 1");
        assert_eq!(updated.surface, "grass");
        assert_eq!(updated.stamps.created_at, court.stamps.created_at);
        assert!(updated.stamps.updated_at > court.stamps.updated_at);

        // Exactly one entity with this id afterwards.
        let matching = store.query(|c| c.id == court.id).await;
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], updated);
    }

    #[tokio::test]
    async fn update_on_missing_id_is_a_silent_noop() {
        let store = court_store(InsertOrder::Append);
        let court = seed(&store, "Court 1").await;

        let before = store.list().await;
        let result = store
            .update(&EntityId::from_string("nonexistent"), |c| {
                c.label = "clobbered".to_string();
            })
            .await;

        assert!(result.is_none());
        assert_eq!(store.list().await, before);
        assert_eq!(store.get(&court.id).await.unwrap().label, "Court 1");
    }

    #[tokio::test]
    async fn remove_deletes_exactly_one() {
        let store = court_store(InsertOrder::Append);
        let a = seed(&store, "A").await;
        let b = seed(&store, "B").await;

        let removed = store.remove(&a.id).await.unwrap();
        assert_eq!(removed.id, a.id);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&a.id).await.is_none());
        assert!(store.get(&b.id).await.is_some());
    }

    #[tokio::test]
    async fn remove_on_missing_id_is_a_silent_noop() {
        let store = court_store(InsertOrder::Append);
        seed(&store, "A").await;

        let before = store.list().await;
        assert!(store.remove(&EntityId::from_string("missing")).await.is_none());
        assert_eq!(store.list().await, before);
    }

    #[tokio::test]
    async fn insert_with_existing_id_replaces_in_place() {
        let store = court_store(InsertOrder::Append);
        let court = seed(&store, "Court 1").await;

        let mut duplicate = court.clone();
        duplicate.label = "Renamed".to_string();
        store.insert(duplicate).await;

        let all = store.list().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, "Renamed");
    }

    #[tokio::test]
    async fn remove_where_returns_removed_in_order() {
        let store = court_store(InsertOrder::Append);
        seed(&store, "keep").await;
        seed(&store, "drop-1").await;
        seed(&store, "drop-2").await;

        let removed = store.remove_where(|c| c.label.starts_with("drop")).await;
        let labels: Vec<String> = removed.into_iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["drop-1", "drop-2"]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn query_filters_without_mutating() {
        let store = court_store(InsertOrder::Append);
        seed(&store, "A").await;
        let b = seed(&store, "B").await;

        let hits = store.query(|c| c.label == "B").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, b.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn observers_receive_events_in_mutation_order() {
        let store = court_store(InsertOrder::Append);
        let mut rx = store.subscribe();

        let court = seed(&store, "Court 1").await;
        store
            .update(&court.id, |c| c.surface = "hard".to_string())
            .await
            .unwrap();
        store.remove(&court.id).await.unwrap();

        assert!(matches!(rx.recv().await.unwrap(), EntityEvent::Created(_)));
        assert!(matches!(rx.recv().await.unwrap(), EntityEvent::Updated(_)));
        match rx.recv().await.unwrap() {
            EntityEvent::Removed(id) => assert_eq!(id, court.id),
            other => panic!("expected Removed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_without_snapshotter_is_healthy() {
        let store = court_store(InsertOrder::Append);
        assert!(store.health().status.is_healthy());
    }
}
