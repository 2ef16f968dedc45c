//! Managed events, the public catalog and registration requests.
//!
//! Events are dual-homed with identical shapes on both sides, so the manager
//! store mirrors into the catalog with the identity projection. Registration
//! requests reference their event by id; deleting an event does not remove
//! its requests — the call site removes them first with
//! [`RequestBook::remove_for_event`], then cancels the event. Request
//! listings come back in store order; screens that want newest-first re-sort
//! at the call site.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_core::environment::StoreEnvironment;
use courtside_runtime::{DomainStore, MirrorSink, StoreBuilder};

/// A bookable event (tournament, open day, coaching camp).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, shared between manager store and catalog
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Venue hosting the event, if one is attached
    pub venue_id: Option<EntityId>,
    /// When the event starts
    pub starts_at: DateTime<Utc>,
    /// Entry fee in minor currency units
    pub fees: u32,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for Event {
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

/// Review status of a registration request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting the organizer's decision
    #[default]
    Pending,
    /// Accepted by the organizer
    Approved,
    /// Rejected by the organizer
    Declined,
}

impl RequestStatus {
    /// Stable string form, matching the serialized representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
        }
    }
}

/// One applicant's request to register for an event.
///
/// Submission time is `stamps.created_at`; the store keeps submission order
/// and screens re-sort as they see fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Unique identifier
    pub id: EntityId,
    /// The event applied for (by id; no live reference)
    pub event_id: EntityId,
    /// Applicant display name
    pub applicant: String,
    /// Review status
    pub status: RequestStatus,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for RegistrationRequest {
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

/// The organizer's event store, mirrored into the public catalog.
pub struct EventManager {
    managed: Arc<DomainStore<Event>>,
    catalog: Arc<DomainStore<Event>>,
}

impl EventManager {
    /// Creates an empty manager/catalog pair with the mirror attached.
    #[must_use]
    pub fn new(env: StoreEnvironment) -> Self {
        let managed = Arc::new(StoreBuilder::new("managed-events", env.clone()).build());
        let catalog = Arc::new(StoreBuilder::new("event-catalog", env).build());
        managed.attach_sink(Arc::new(MirrorSink::identity(Arc::clone(&catalog))));
        Self { managed, catalog }
    }

    /// The organizer-side store.
    #[must_use]
    pub fn managed(&self) -> &Arc<DomainStore<Event>> {
        &self.managed
    }

    /// The public catalog every user browses.
    #[must_use]
    pub fn catalog(&self) -> &Arc<DomainStore<Event>> {
        &self.catalog
    }

    /// Publishes a new event. Visible in the catalog before this returns.
    #[tracing::instrument(skip_all, fields(name = %name.as_ref()))]
    pub async fn publish_event(
        &self,
        name: impl AsRef<str>,
        venue_id: Option<EntityId>,
        starts_at: DateTime<Utc>,
        fees: u32,
    ) -> Event {
        let name = name.as_ref().to_owned();
        self.managed
            .create(|id, stamps| Event {
                id,
                name,
                venue_id,
                starts_at,
                fees,
                stamps,
            })
            .await
    }

    /// Applies a patch to a managed event. `None` if the id is unknown.
    pub async fn update_event<F>(&self, id: &EntityId, patch: F) -> Option<Event>
    where
        F: FnOnce(&mut Event),
    {
        self.managed.update(id, patch).await
    }

    /// Cancels an event on both sides.
    ///
    /// Requests for the event are left in place; call
    /// [`RequestBook::remove_for_event`] first if they should go too.
    pub async fn cancel_event(&self, id: &EntityId) -> Option<Event> {
        self.managed.remove(id).await
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("managed", &self.managed)
            .field("catalog", &self.catalog)
            .finish()
    }
}

/// The registration request collection and its operations.
pub struct RequestBook {
    requests: DomainStore<RegistrationRequest>,
}

impl RequestBook {
    /// Creates an empty request book.
    #[must_use]
    pub fn new(env: StoreEnvironment) -> Self {
        Self {
            requests: StoreBuilder::new("registration-requests", env).build(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn requests(&self) -> &DomainStore<RegistrationRequest> {
        &self.requests
    }

    /// Submits a pending request for an event.
    pub async fn submit(
        &self,
        event_id: EntityId,
        applicant: impl Into<String>,
    ) -> RegistrationRequest {
        let applicant = applicant.into();
        self.requests
            .create(|id, stamps| RegistrationRequest {
                id,
                event_id,
                applicant,
                status: RequestStatus::Pending,
                stamps,
            })
            .await
    }

    /// Marks a request approved. `None` if the request is gone.
    pub async fn approve(&self, id: &EntityId) -> Option<RegistrationRequest> {
        self.requests
            .update(id, |r| r.status = RequestStatus::Approved)
            .await
    }

    /// Marks a request declined. `None` if the request is gone.
    pub async fn decline(&self, id: &EntityId) -> Option<RegistrationRequest> {
        self.requests
            .update(id, |r| r.status = RequestStatus::Declined)
            .await
    }

    /// All requests for one event, in submission order.
    pub async fn for_event(&self, event_id: &EntityId) -> Vec<RegistrationRequest> {
        self.requests.query(|r| &r.event_id == event_id).await
    }

    /// Pending requests for one event, in submission order.
    pub async fn pending_for_event(&self, event_id: &EntityId) -> Vec<RegistrationRequest> {
        self.requests
            .query(|r| &r.event_id == event_id && r.status == RequestStatus::Pending)
            .await
    }

    /// Removes every request for one event, returning the removed records.
    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    pub async fn remove_for_event(&self, event_id: &EntityId) -> Vec<RegistrationRequest> {
        self.requests
            .remove_where(|r| &r.event_id == event_id)
            .await
    }
}

impl std::fmt::Debug for RequestBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBook")
            .field("requests", &self.requests)
            .finish()
    }
}
