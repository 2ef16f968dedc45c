//! Partner bookings and the public booking board.
//!
//! Bookings are dual-homed: the partner app mutates [`PartnerBooking`]s at
//! the desk, and every mutation is mirrored into the public [`Booking`]
//! board in the same call. The public shape drops the guest's personal
//! details; every shared field, ids and timestamps included, stays
//! bit-identical between the two copies. The mirror is one-directional and
//! never retried: a failed delivery leaves the desk-side mutation standing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_core::environment::StoreEnvironment;
use courtside_core::snapshot::SnapshotStore;
use courtside_runtime::{DomainStore, MirrorSink, Snapshotter, StoreBuilder};

/// Personal details of the guest a booking was made for.
///
/// Desk-side only; never mirrored to the public board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    /// Guest name
    pub name: String,
    /// Guest phone number
    pub phone: String,
}

/// A booking as the partner desk sees it, guest details included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartnerBooking {
    /// Unique identifier, shared with the public copy
    pub id: EntityId,
    /// The booked venue (by id; venue removal does not cascade here)
    pub venue_id: EntityId,
    /// Court or pitch label within the venue
    pub court: String,
    /// Slot start
    pub starts_at: DateTime<Utc>,
    /// Slot end
    pub ends_at: DateTime<Utc>,
    /// Total fee in minor currency units
    pub fee: u32,
    /// Who the booking is for
    pub guest: GuestDetails,
    /// Creation and mutation timestamps, shared with the public copy
    pub stamps: Stamps,
}

impl PartnerBooking {
    /// The public shape of this booking: same id, same timestamps, no guest
    /// details.
    #[must_use]
    pub fn public_view(&self) -> Booking {
        Booking {
            id: self.id.clone(),
            venue_id: self.venue_id.clone(),
            court: self.court.clone(),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            fee: self.fee,
            stamps: self.stamps,
        }
    }
}

impl Entity for PartnerBooking {
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

/// A booking as the public board shows it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier, shared with the desk copy
    pub id: EntityId,
    /// The booked venue
    pub venue_id: EntityId,
    /// Court or pitch label within the venue
    pub court: String,
    /// Slot start
    pub starts_at: DateTime<Utc>,
    /// Slot end
    pub ends_at: DateTime<Utc>,
    /// Total fee in minor currency units
    pub fee: u32,
    /// Creation and mutation timestamps, shared with the desk copy
    pub stamps: Stamps,
}

impl Entity for Booking {
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

/// The desk store wired to mirror every mutation into the public board.
pub struct PartnerBookingDesk {
    desk: Arc<DomainStore<PartnerBooking>>,
    board: Arc<DomainStore<Booking>>,
}

impl PartnerBookingDesk {
    const STORAGE_KEY: &'static str = "demo-bookings-storage";
    const COLLECTION_FIELD: &'static str = "bookings";

    /// Creates an empty, non-persistent desk/board pair.
    #[must_use]
    pub fn new(env: StoreEnvironment) -> Self {
        let desk = Arc::new(StoreBuilder::new("partner-bookings", env.clone()).build());
        let board = Arc::new(StoreBuilder::new("bookings", env).build());
        Self::wire(desk, board)
    }

    /// Creates a desk persisted through `backend`, replaying the hydrated
    /// bookings onto the public board before the mirror is attached.
    pub async fn hydrated(env: StoreEnvironment, backend: Arc<dyn SnapshotStore>) -> Self {
        let snapshotter = Snapshotter::new(backend, Self::STORAGE_KEY, Self::COLLECTION_FIELD);
        let desk: Arc<DomainStore<PartnerBooking>> = Arc::new(
            StoreBuilder::new("partner-bookings", env.clone())
                .with_snapshotter(snapshotter)
                .hydrate()
                .await,
        );
        let board = Arc::new(StoreBuilder::new("bookings", env).build());

        // The board is session-local; rebuild it from the hydrated desk so
        // both sides agree before any new mutation arrives.
        for booking in desk.list().await {
            board.insert(booking.public_view()).await;
        }

        Self::wire(desk, board)
    }

    fn wire(desk: Arc<DomainStore<PartnerBooking>>, board: Arc<DomainStore<Booking>>) -> Self {
        desk.attach_sink(Arc::new(MirrorSink::new(
            Arc::clone(&board),
            PartnerBooking::public_view,
        )));
        Self { desk, board }
    }

    /// The desk-side store, guest details included.
    #[must_use]
    pub fn desk(&self) -> &Arc<DomainStore<PartnerBooking>> {
        &self.desk
    }

    /// The public board.
    #[must_use]
    pub fn board(&self) -> &Arc<DomainStore<Booking>> {
        &self.board
    }

    /// Books a slot for a guest. Mirrored to the board before returning.
    #[tracing::instrument(skip_all, fields(venue_id = %venue_id))]
    pub async fn book(
        &self,
        venue_id: EntityId,
        court: impl Into<String>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        fee: u32,
        guest: GuestDetails,
    ) -> PartnerBooking {
        let court = court.into();
        self.desk
            .create(|id, stamps| PartnerBooking {
                id,
                venue_id,
                court,
                starts_at,
                ends_at,
                fee,
                guest,
                stamps,
            })
            .await
    }

    /// Moves a booking to a new slot. `None` if the booking is gone.
    pub async fn reschedule(
        &self,
        id: &EntityId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Option<PartnerBooking> {
        self.desk
            .update(id, |b| {
                b.starts_at = starts_at;
                b.ends_at = ends_at;
            })
            .await
    }

    /// Cancels a booking on both sides. `None` if the booking is gone.
    pub async fn cancel(&self, id: &EntityId) -> Option<PartnerBooking> {
        self.desk.remove(id).await
    }

    /// Desk-side bookings for one venue, in booking order.
    pub async fn bookings_for_venue(&self, venue_id: &EntityId) -> Vec<PartnerBooking> {
        self.desk.query(|b| &b.venue_id == venue_id).await
    }
}

impl std::fmt::Debug for PartnerBookingDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerBookingDesk")
            .field("desk", &self.desk)
            .field("board", &self.board)
            .finish()
    }
}
