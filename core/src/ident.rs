//! Identifier generation.
//!
//! One shared utility produces the identifiers for every entity family. The
//! production implementation is UUID v4: fixed 36-character format, URL-safe,
//! fully offline and synchronous. Collisions are treated as negligible for a
//! single-device, single-session context; there is deliberately no collision
//! handling and no hardening for multi-writer systems.

use crate::entity::EntityId;
use uuid::Uuid;

/// Source of fresh entity identifiers.
///
/// Implementations must be cheap to call and must not block: ids are generated
/// inline inside store mutations.
///
/// # Examples
///
/// ```
/// use courtside_core::ident::{IdGenerator, UuidGenerator};
///
/// let ids = UuidGenerator;
/// let a = ids.generate();
/// let b = ids.generate();
/// assert_ne!(a, b);
/// ```
pub trait IdGenerator: Send + Sync {
    /// Produces a fresh identifier, unique for the lifetime of the process.
    fn generate(&self) -> EntityId;
}

/// Production generator: hyphenated UUID v4.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> EntityId {
        EntityId::from_string(Uuid::new_v4().to_string())
    }
}
