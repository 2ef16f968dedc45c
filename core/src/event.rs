//! Entity change events and the sink trait for cross-store mirroring.
//!
//! Every mutation a [`DomainStore`] applies produces one [`EntityEvent`]. The
//! event serves two consumers:
//!
//! - **Observers** (screens, projections) receive a clone over a broadcast
//!   channel and react after the fact.
//! - **Sinks** ([`EventSink`]) are delivered to *inline*, inside the
//!   originating mutation, before the call returns. This is how a manager
//!   store keeps its paired public store consistent: the manager-side
//!   mutation is fully applied first, then each sink runs to completion, in
//!   registration order.
//!
//! # Delivery semantics
//!
//! One-directional, no queue, no retry, no transaction. A sink error is
//! logged and counted by the store; the originating mutation stands and later
//! sinks still run. This asymmetry is an accepted property of the design, not
//! a defect to engineer around.
//!
//! [`DomainStore`]: ../../courtside_runtime/struct.DomainStore.html

use crate::entity::{Entity, EntityId};
use futures::future::BoxFuture;
use thiserror::Error;

/// Errors a sink may surface to the delivering store.
///
/// The store logs and counts these; it never propagates them to the caller of
/// the originating mutation.
#[derive(Error, Debug, Clone)]
pub enum SinkError {
    /// The sink's target store rejected or could not apply the event.
    #[error("Sink failed to apply event: {0}")]
    ApplyFailed(String),

    /// The sink is no longer connected to its target.
    #[error("Sink target is gone: {0}")]
    TargetGone(String),
}

/// A typed change notification emitted after every store mutation.
///
/// `Created` and `Updated` carry the full post-mutation entity so a mirror
/// can keep both copies bit-identical, including timestamps. `Removed`
/// carries only the id; the entity is gone.
#[derive(Clone, Debug)]
pub enum EntityEvent<E: Entity> {
    /// A new entity entered the collection.
    Created(E),
    /// An existing entity was replaced in place.
    Updated(E),
    /// The entity with this id left the collection.
    Removed(EntityId),
}

impl<E: Entity> EntityEvent<E> {
    /// The id of the affected entity.
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        match self {
            Self::Created(e) | Self::Updated(e) => e.id(),
            Self::Removed(id) => id,
        }
    }

    /// Short label for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Removed(_) => "removed",
        }
    }
}

/// Receiver of entity events, delivered inline within the originating
/// mutation.
///
/// # Dyn Compatibility
///
/// Uses an explicit [`BoxFuture`] return instead of `async fn` so stores can
/// hold `Arc<dyn EventSink<E>>` trait objects.
///
/// # Contract
///
/// - `apply` is awaited to completion before the originating store mutation
///   returns to its caller
/// - Implementations must not call back into the delivering store (the
///   delivering store's lock is not held during delivery, but re-entrant
///   mutation would reorder events)
///
/// # Example
///
/// ```ignore
/// struct AuditSink;
///
/// impl EventSink<Venue> for AuditSink {
///     fn apply(&self, event: EntityEvent<Venue>) -> BoxFuture<'_, Result<(), SinkError>> {
///         Box::pin(async move {
///             tracing::info!(id = %event.entity_id(), kind = event.kind(), "venue changed");
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait EventSink<E: Entity>: Send + Sync {
    /// Applies one event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the event could not be applied. The delivering
    /// store logs the error and continues; it never unwinds the mutation.
    fn apply(&self, event: EntityEvent<E>) -> BoxFuture<'_, Result<(), SinkError>>;
}
