//! Venues and the venue creation wizard.
//!
//! A [`Venue`] is committed to the directory only when the wizard draft is
//! submitted. Until then the in-progress input lives in a
//! [`DraftSlot`](courtside_runtime::DraftSlot) and is invisible to
//! [`VenueDirectory::venues`] listings. Nested sections of the draft
//! (address, contact) are merged through dedicated patch types so staging one
//! field never clobbers its siblings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use courtside_core::entity::{Entity, EntityId, Stamps};
use courtside_core::environment::StoreEnvironment;
use courtside_core::snapshot::SnapshotStore;
use courtside_runtime::{DomainStore, DraftSlot, Snapshotter, StoreBuilder};

/// Street address of a venue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// First address line
    pub line_one: String,
    /// Optional second address line
    pub line_two: Option<String>,
    /// City name
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub postal_code: String,
}

/// Contact details shown on a venue's public page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Optional website URL
    pub website: Option<String>,
}

/// A bookable sports venue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Sports offered, e.g. `"tennis"`, `"padel"`
    pub sports: Vec<String>,
    /// Street address
    pub address: Address,
    /// Contact details
    pub contact: ContactInfo,
    /// Photo URLs, newest first
    pub photos: Vec<String>,
    /// Hourly court fee in minor currency units
    pub hourly_fee: u32,
    /// Creation and mutation timestamps
    pub stamps: Stamps,
}

impl Entity for Venue {
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

/// Partial update for the address section of the wizard.
///
/// Only `Some` fields are applied; everything else keeps its staged value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressPatch {
    /// New first address line
    pub line_one: Option<String>,
    /// New second address line
    pub line_two: Option<String>,
    /// New city
    pub city: Option<String>,
    /// New state or region
    pub state: Option<String>,
    /// New postal code
    pub postal_code: Option<String>,
}

impl AddressPatch {
    fn apply(self, target: &mut Address) {
        if let Some(line_one) = self.line_one {
            target.line_one = line_one;
        }
        if let Some(line_two) = self.line_two {
            target.line_two = Some(line_two);
        }
        if let Some(city) = self.city {
            target.city = city;
        }
        if let Some(state) = self.state {
            target.state = state;
        }
        if let Some(postal_code) = self.postal_code {
            target.postal_code = postal_code;
        }
    }
}

/// Partial update for the contact section of the wizard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactPatch {
    /// New phone number
    pub phone: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New website URL
    pub website: Option<String>,
}

impl ContactPatch {
    fn apply(self, target: &mut ContactInfo) {
        if let Some(phone) = self.phone {
            target.phone = phone;
        }
        if let Some(email) = self.email {
            target.email = email;
        }
        if let Some(website) = self.website {
            target.website = Some(website);
        }
    }
}

/// In-progress input of the venue creation wizard.
///
/// Accumulates across the wizard's screens (basics, address, contact, photos,
/// pricing) and becomes a [`Venue`] on submit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueDraft {
    /// Staged display name
    pub name: Option<String>,
    /// Staged sports
    pub sports: Vec<String>,
    /// Staged address
    pub address: Address,
    /// Staged contact details
    pub contact: ContactInfo,
    /// Staged photo URLs, newest first
    pub photos: Vec<String>,
    /// Staged hourly fee
    pub hourly_fee: Option<u32>,
}

impl VenueDraft {
    fn into_venue(self, id: EntityId, stamps: Stamps) -> Venue {
        Venue {
            id,
            name: self.name.unwrap_or_default(),
            sports: self.sports,
            address: self.address,
            contact: self.contact,
            photos: self.photos,
            hourly_fee: self.hourly_fee.unwrap_or_default(),
            stamps,
        }
    }
}

/// The venue collection plus the creation wizard's staging slot.
pub struct VenueDirectory {
    venues: DomainStore<Venue>,
    draft: DraftSlot<VenueDraft>,
}

impl VenueDirectory {
    const STORAGE_KEY: &'static str = "venues-storage";
    const COLLECTION_FIELD: &'static str = "venues";

    /// Creates an empty, non-persistent directory.
    #[must_use]
    pub fn new(env: StoreEnvironment) -> Self {
        Self {
            venues: StoreBuilder::new("venues", env).build(),
            draft: DraftSlot::new(),
        }
    }

    /// Creates a directory persisted through `backend` and hydrated from the
    /// previously stored document (empty if absent or unreadable).
    pub async fn hydrated(env: StoreEnvironment, backend: Arc<dyn SnapshotStore>) -> Self {
        let snapshotter = Snapshotter::new(backend, Self::STORAGE_KEY, Self::COLLECTION_FIELD);
        let venues = StoreBuilder::new("venues", env)
            .with_snapshotter(snapshotter)
            .hydrate()
            .await;
        Self {
            venues,
            draft: DraftSlot::new(),
        }
    }

    /// The committed venue collection.
    #[must_use]
    pub const fn venues(&self) -> &DomainStore<Venue> {
        &self.venues
    }

    /// Stages basics (name, sports, fee) into the wizard draft.
    pub async fn stage<F>(&self, merge: F)
    where
        F: FnOnce(&mut VenueDraft),
    {
        self.draft.update(merge).await;
    }

    /// Merges an address patch into the draft without touching other sections.
    pub async fn stage_address(&self, patch: AddressPatch) {
        self.draft.update(|d| patch.apply(&mut d.address)).await;
    }

    /// Merges a contact patch into the draft without touching other sections.
    pub async fn stage_contact(&self, patch: ContactPatch) {
        self.draft.update(|d| patch.apply(&mut d.contact)).await;
    }

    /// Stages a photo at the front of the draft's photo feed.
    pub async fn stage_photo(&self, url: impl Into<String>) {
        let url = url.into();
        self.draft.update(|d| d.photos.insert(0, url)).await;
    }

    /// Returns a copy of the current wizard draft.
    pub async fn draft(&self) -> VenueDraft {
        self.draft.peek().await
    }

    /// Discards the in-progress wizard input.
    pub async fn discard_draft(&self) {
        self.draft.reset().await;
    }

    /// Commits the staged draft as a new venue and resets the wizard.
    ///
    /// The directory performs no validation; screens check required fields
    /// before calling this.
    #[tracing::instrument(skip_all)]
    pub async fn submit_draft(&self) -> Venue {
        let draft = self.draft.take().await;
        let venue = self
            .venues
            .create(|id, stamps| draft.into_venue(id, stamps))
            .await;
        tracing::info!(venue_id = %venue.id, name = %venue.name, "venue committed from wizard");
        venue
    }

    /// Prepends a photo to a committed venue's feed.
    ///
    /// Returns `None` without side effects if the venue is gone.
    pub async fn add_photo(&self, id: &EntityId, url: impl Into<String>) -> Option<Venue> {
        let url = url.into();
        self.venues.update(id, |v| v.photos.insert(0, url)).await
    }

    /// Removes a venue. Bookings referencing it are left untouched.
    pub async fn remove_venue(&self, id: &EntityId) -> Option<Venue> {
        self.venues.remove(id).await
    }
}

impl std::fmt::Debug for VenueDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueDirectory")
            .field("venues", &self.venues)
            .finish_non_exhaustive()
    }
}
