//! Environment traits for dependency injection.
//!
//! All external inputs a store needs — the current time and fresh identifiers
//! — are abstracted behind traits and injected via [`StoreEnvironment`].
//! Production code wires [`SystemClock`] and the UUID generator from
//! [`crate::ident`]; tests inject fixed/sequential implementations so every
//! store action is deterministic.

use crate::ident::{IdGenerator, UuidGenerator};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability.
///
/// # Examples
///
/// ```
/// use courtside_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now <= clock.now());
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Injected dependencies shared by every domain store.
///
/// One environment instance is created at the application's composition root
/// and cloned into each store; cloning is cheap (two `Arc`s). This replaces
/// module-level singletons: nothing in Courtside reaches for a global clock
/// or id source.
///
/// # Example
///
/// ```
/// use courtside_core::environment::StoreEnvironment;
///
/// let env = StoreEnvironment::production();
/// let id = env.ids.generate();
/// let now = env.clock.now();
/// assert!(!id.as_str().is_empty());
/// let _ = now;
/// ```
#[derive(Clone)]
pub struct StoreEnvironment {
    /// Clock for creation/update timestamps.
    pub clock: Arc<dyn Clock>,
    /// Generator for entity identifiers.
    pub ids: Arc<dyn IdGenerator>,
}

impl StoreEnvironment {
    /// Creates an environment from explicit implementations.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { clock, ids }
    }

    /// Creates the production environment: system clock + UUID v4 ids.
    #[must_use]
    pub fn production() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
        }
    }
}

impl std::fmt::Debug for StoreEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEnvironment").finish_non_exhaustive()
    }
}
