//! Draft staging area for multi-step creation wizards.
//!
//! A wizard spanning several screens needs a place to keep partial input
//! before a final submit commits a new entity. [`DraftSlot`] is that place:
//! one named staging region per wizard, distinct from any committed
//! collection, initialized to the draft type's default shape.
//!
//! The draft never appears in a store's `list()`/`query()` results; only
//! [`DraftSlot::take`] hands the staged value to whatever performs the
//! commit, resetting the slot to the default shape in the same step so no
//! submit path can leak prior input.

use tokio::sync::RwLock;

/// A single mutable staging area for one draft type.
///
/// Nested sections of a draft (address, contact info) should be updated via
/// dedicated partial-merge methods on the draft type itself, called from the
/// [`update`](Self::update) closure, so sibling fields are never clobbered by
/// a whole-section overwrite.
///
/// # Example
///
/// ```ignore
/// let slot: DraftSlot<VenueDraft> = DraftSlot::new();
/// slot.update(|d| d.name = Some("Center Court".into())).await;
/// slot.update(|d| d.merge_address(AddressPatch { city: Some("Delhi".into()), ..Default::default() })).await;
/// let draft = slot.take().await; // slot is back to VenueDraft::default()
/// ```
#[derive(Debug, Default)]
pub struct DraftSlot<D> {
    value: RwLock<D>,
}

impl<D> DraftSlot<D>
where
    D: Clone + Default + Send + Sync,
{
    /// Creates a slot holding the default draft shape.
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: RwLock::new(D::default()),
        }
    }

    /// Merges a partial update into the staged draft.
    pub async fn update<F>(&self, merge: F)
    where
        F: FnOnce(&mut D),
    {
        let mut value = self.value.write().await;
        merge(&mut value);
    }

    /// Returns a copy of the current draft.
    pub async fn peek(&self) -> D {
        self.value.read().await.clone()
    }

    /// Discards in-progress input, restoring the default shape.
    pub async fn reset(&self) {
        *self.value.write().await = D::default();
    }

    /// Yields the staged draft for submission, atomically resetting the slot
    /// to the default shape.
    pub async fn take(&self) -> D {
        let mut value = self.value.write().await;
        std::mem::take(&mut *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct WizardDraft {
        name: Option<String>,
        city: Option<String>,
    }

    #[tokio::test]
    async fn updates_merge_without_clobbering_siblings() {
        let slot: DraftSlot<WizardDraft> = DraftSlot::new();

        slot.update(|d| d.name = Some("Acme".to_string())).await;
        slot.update(|d| d.city = Some("Delhi".to_string())).await;

        let draft = slot.peek().await;
        assert_eq!(draft.name.as_deref(), Some("Acme"));
        assert_eq!(draft.city.as_deref(), Some("Delhi"));
    }

    #[tokio::test]
    async fn take_yields_draft_and_restores_default() {
        let slot: DraftSlot<WizardDraft> = DraftSlot::new();
        slot.update(|d| d.name = Some("Acme".to_string())).await;

        let taken = slot.take().await;
        assert_eq!(taken.name.as_deref(), Some("Acme"));
        assert_eq!(slot.peek().await, WizardDraft::default());
    }

    #[tokio::test]
    async fn reset_discards_in_progress_input() {
        let slot: DraftSlot<WizardDraft> = DraftSlot::new();
        slot.update(|d| d.name = Some("Abandoned".to_string())).await;

        slot.reset().await;
        assert_eq!(slot.peek().await, WizardDraft::default());
    }
}
