//! Cross-store mirroring: the manager→public synchronizer.
//!
//! A dual-homed entity is mutated in one store (the manager side) but also
//! readable through a second (the public side). A [`MirrorSink`] attached to
//! the manager store keeps the public copy consistent: every event is
//! projected into the public shape and applied to the target store inline,
//! within the originating mutation, so both `get(id)` calls agree
//! field-for-field over the shared fields the moment the mutation returns.
//!
//! The push is one-directional and untransacted: the public store never
//! originates these mutations, and a failed application leaves the manager
//! side standing (the delivering store logs and counts the failure).

use crate::DomainStore;
use courtside_core::entity::Entity;
use courtside_core::event::{EntityEvent, EventSink, SinkError};
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Projecting sink that applies a manager store's events to a public store.
///
/// The projection maps the manager entity into the public shape, preserving
/// the id and stamps so both copies stay bit-identical over shared fields
/// (manager-only fields such as guest details are simply not part of the
/// public shape).
///
/// # Example
///
/// ```ignore
/// // Partner bookings carry guest details the public board does not.
/// let sink = MirrorSink::new(Arc::clone(&public_board), |b: &PartnerBooking| b.public_view());
/// partner_desk.attach_sink(Arc::new(sink));
/// ```
pub struct MirrorSink<E: Entity, P: Entity> {
    target: Arc<DomainStore<P>>,
    project: Box<dyn Fn(&E) -> P + Send + Sync>,
}

impl<E, P> MirrorSink<E, P>
where
    E: Entity,
    P: Entity + Serialize + DeserializeOwned,
{
    /// Creates a mirror applying `project`ed entities to `target`.
    ///
    /// The projection must preserve the entity's id; otherwise removals
    /// cannot be correlated and the consistency invariant is void.
    pub fn new(
        target: Arc<DomainStore<P>>,
        project: impl Fn(&E) -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            target,
            project: Box::new(project),
        }
    }
}

impl<E> MirrorSink<E, E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    /// Creates an identity mirror for pairs whose shapes match exactly.
    #[must_use]
    pub fn identity(target: Arc<DomainStore<E>>) -> Self {
        Self::new(target, Clone::clone)
    }
}

impl<E, P> EventSink<E> for MirrorSink<E, P>
where
    E: Entity,
    P: Entity + Serialize + DeserializeOwned,
{
    fn apply(&self, event: EntityEvent<E>) -> BoxFuture<'_, Result<(), SinkError>> {
        Box::pin(async move {
            match event {
                EntityEvent::Created(entity) => {
                    self.target.insert((self.project)(&entity)).await;
                },
                EntityEvent::Updated(entity) => {
                    // Whole-entity replace keeps the mirrored stamps identical.
                    if self.target.replace((self.project)(&entity)).await.is_none() {
                        tracing::debug!(
                            target = %self.target.name(),
                            id = %entity.id(),
                            "mirror update for an id the target does not hold"
                        );
                    }
                },
                EntityEvent::Removed(id) => {
                    self.target.remove(&id).await;
                },
            }
            Ok(())
        })
    }
}

impl<E, P> std::fmt::Debug for MirrorSink<E, P>
where
    E: Entity,
    P: Entity + Serialize + DeserializeOwned,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorSink")
            .field("target", &self.target.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use crate::{InsertOrder, StoreBuilder};
    use courtside_core::entity::{EntityId, Stamps};
    use courtside_testing::mocks::test_environment;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Listing {
        id: EntityId,
        title: String,
        stamps: Stamps,
    }

    impl Entity for Listing {
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

    fn pair() -> (Arc<DomainStore<Listing>>, Arc<DomainStore<Listing>>) {
        let env = test_environment();
        let manager = Arc::new(
            StoreBuilder::new("manager-listings", env.clone())
                .with_order(InsertOrder::Append)
                .build(),
        );
        let public = Arc::new(StoreBuilder::new("public-listings", env).build());
        manager.attach_sink(Arc::new(MirrorSink::identity(Arc::clone(&public))));
        (manager, public)
    }

    #[tokio::test]
    async fn create_is_mirrored_field_for_field() {
        let (manager, public) = pair();

        let listing = manager
            .create(|id, stamps| Listing {
                id,
                title: "Sunday 5-a-side".to_string(),
                stamps,
            })
            .await;

        assert_eq!(public.get(&listing.id).await.unwrap(), listing);
    }

    #[tokio::test]
    async fn update_keeps_copies_bit_identical() {
        let (manager, public) = pair();
        let listing = manager
            .create(|id, stamps| Listing {
                id,
                title: "Morning drills".to_string(),
                stamps,
            })
            .await;

        let updated = manager
            .update(&listing.id, |l| l.title = "Evening drills".to_string())
            .await
            .unwrap();

        let mirrored = public.get(&listing.id).await.unwrap();
        assert_eq!(mirrored, updated);
        assert_eq!(mirrored.stamps.updated_at, updated.stamps.updated_at);
    }

    #[tokio::test]
    async fn remove_propagates() {
        let (manager, public) = pair();
        let listing = manager
            .create(|id, stamps| Listing {
                id,
                title: "To delete".to_string(),
                stamps,
            })
            .await;

        manager.remove(&listing.id).await.unwrap();
        assert!(public.get(&listing.id).await.is_none());
        assert!(public.is_empty().await);
    }

    #[tokio::test]
    async fn debug_output_names_the_target_store() {
        let (_manager, public) = pair();
        let sink: MirrorSink<Listing, Listing> = MirrorSink::identity(public);

        let rendered = format!("{sink:?}");
        assert!(rendered.contains("public-listings"));
    }

    #[tokio::test]
    async fn public_side_mutations_do_not_flow_back() {
        let (manager, public) = pair();
        let listing = manager
            .create(|id, stamps| Listing {
                id,
                title: "One way".to_string(),
                stamps,
            })
            .await;

        // Mutating the public copy directly leaves the manager untouched.
        public
            .update(&listing.id, |l| l.title = "Drifted".to_string())
            .await
            .unwrap();

        assert_eq!(manager.get(&listing.id).await.unwrap().title, "One way");
    }
}
