//! The minimal tree interface the reconciliation core runs against.
//!
//! Anything that can hold an ordered list of entries, lay them out and
//! scroll them can host a [`ChatList`](crate::state::ChatList): the
//! in-memory [`StackLayout`](super::stack::StackLayout), a retained-mode
//! widget tree, a DOM bridge. The core never touches geometry except
//! through `measure` and `metrics`.

use super::types::{BoundingBox, ScrollMetrics, Viewport};
use crate::model::{Entry, EntryId};

/// Ordered, scrollable container of entries.
///
/// # Layout staleness
/// Structural changes (`insert_before`, `append_child`, `remove_child`,
/// `entry_mut`) do not update geometry. `measure` and `metrics` report the
/// state of the last `flush_layout`, the way a render tree reports stale
/// boxes until the next layout pass. Callers that need settled geometry
/// flush first.
pub trait LayoutTree {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether there are no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at a sequence position.
    fn entry_at(&self, index: usize) -> Option<&Entry>;

    /// Sequence position of an entry.
    fn position(&self, id: &EntryId) -> Option<usize>;

    /// Entry by id.
    fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.position(id).and_then(|i| self.entry_at(i))
    }

    /// Id of the first entry, if any.
    fn first_id(&self) -> Option<EntryId> {
        self.entry_at(0).map(|e| e.id().clone())
    }

    /// Insert `entry` directly before `reference`.
    ///
    /// # Errors
    /// Hands the entry back if `reference` is not in the tree.
    fn insert_before(&mut self, reference: &EntryId, entry: Entry) -> Result<(), Entry>;

    /// Append `entry` after the last entry.
    fn append_child(&mut self, entry: Entry);

    /// Remove an entry, returning it.
    fn remove_child(&mut self, id: &EntryId) -> Option<Entry>;

    /// Mutable access for settlement updates. Invalidates layout from the entry on.
    fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry>;

    /// Box of an entry as of the last flush.
    fn measure(&self, id: &EntryId) -> Option<BoundingBox>;

    /// Recompute geometry for everything invalidated since the last flush.
    fn flush_layout(&mut self);

    /// Scroll state as of the last flush.
    fn metrics(&self) -> ScrollMetrics;

    /// Write the scroll offset, clamped to the valid range.
    fn set_scroll_offset(&mut self, offset: f64);

    /// Container dimensions.
    fn viewport(&self) -> Viewport;

    /// Resize the container. Invalidates all layout.
    fn set_viewport(&mut self, viewport: Viewport);
}
