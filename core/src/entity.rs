//! Entity identity and timestamp model.
//!
//! Every domain collection in Courtside holds entities: records with a unique,
//! immutable string identifier and a pair of lifecycle timestamps. Identifiers
//! are generated once at creation time (see [`crate::ident`]) and are passed
//! between screens as plain strings, so they must stay URL/param-safe.
//!
//! # Example
//!
//! ```
//! use courtside_core::entity::{Entity, EntityId, Stamps};
//! use chrono::Utc;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Academy {
//!     id: EntityId,
//!     name: String,
//!     stamps: Stamps,
//! }
//!
//! impl Entity for Academy {
//!     fn id(&self) -> &EntityId {
//!         &self.id
//!     }
//!     fn stamps(&self) -> &Stamps {
//!         &self.stamps
//!     }
//!     fn stamps_mut(&mut self) -> &mut Stamps {
//!         &mut self.stamps
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity within one domain collection.
///
/// Wraps a URL-safe string. The canonical production format is a UUID v4
/// rendered in hyphenated form (36 characters), but the type accepts any
/// string so deterministic test generators can produce readable ids.
///
/// Ids are compared by string equality and never reassigned after creation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an id from a random UUID v4.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing string id.
    ///
    /// Used when rehydrating persisted entities and by test generators; the
    /// caller is responsible for uniqueness within the target store.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Creation and last-update timestamps carried by every entity.
///
/// `created_at` is set once when the entity is constructed; `updated_at` is
/// refreshed by the store on every successful update. The two are equal for a
/// freshly created entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamps {
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
    /// When the entity was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Stamps {
    /// Creates stamps for a freshly constructed entity.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes `updated_at`, leaving `created_at` untouched.
    pub const fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// A uniquely identified record belonging to one domain collection.
///
/// The store relies on this trait for exactly two things: locating entities by
/// id and refreshing `updated_at` after a mutation. Everything else about an
/// entity's shape is the domain's business.
///
/// # Invariants
///
/// - `id()` never changes for the lifetime of the entity
/// - `stamps().created_at` never changes after construction
pub trait Entity: Clone + Send + Sync + 'static {
    /// The entity's unique identifier.
    fn id(&self) -> &EntityId;

    /// The entity's lifecycle timestamps.
    fn stamps(&self) -> &Stamps;

    /// Mutable access to the timestamps, used by the store to refresh
    /// `updated_at` on update.
    fn stamps_mut(&mut self) -> &mut Stamps;
}
