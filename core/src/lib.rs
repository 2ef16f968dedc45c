//! # Courtside Core
//!
//! Core traits and types for the Courtside domain-store architecture.
//!
//! This crate provides the fundamental abstractions for building dependency-
//! injected, in-memory entity stores with typed change events.
//!
//! ## Core Concepts
//!
//! - **Entity**: a uniquely identified record belonging to one domain
//!   collection, carrying creation/update timestamps
//! - **`EntityEvent`**: a typed change notification (created, updated,
//!   removed) emitted by a store after every mutation
//! - **`EventSink`**: the subscriber seam through which one store's mutations
//!   are mirrored into a paired store
//! - **Environment**: injected dependencies (clock, id generation) via traits
//! - **`SnapshotStore`**: keyed JSON document storage for optional,
//!   fire-and-forget persistence
//!
//! ## Architecture Principles
//!
//! - Explicit dependency injection (no module-level singletons)
//! - Stores own their collections exclusively; cross-store effects flow only
//!   through typed events
//! - Expected conditions (not-found) are `Option`, never errors
//!
//! ## Example
//!
//! ```
//! use courtside_core::entity::{Entity, EntityId, Stamps};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Venue {
//!     id: EntityId,
//!     name: String,
//!     stamps: Stamps,
//! }
//!
//! impl Entity for Venue {
//!     fn id(&self) -> &EntityId {
//!         &self.id
//!     }
//!
//!     fn stamps(&self) -> &Stamps {
//!         &self.stamps
//!     }
//!
//!     fn stamps_mut(&mut self) -> &mut Stamps {
//!         &mut self.stamps
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod entity;
pub mod environment;
pub mod event;
pub mod ident;
pub mod snapshot;
