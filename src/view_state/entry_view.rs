//! Entry view with its computed layout.

use super::types::BoundingBox;
use crate::model::Entry;

/// A list entry together with its last flushed layout.
///
/// EntryView OWNS the domain entry rather than referencing it, so the
/// layout tree can reorder, insert and evict without lifetime juggling.
///
/// # Staleness
/// `layout` is only as fresh as the last layout flush. Entries inserted
/// since then carry `BoundingBox::default()`, the way a render tree shows
/// stale geometry until the next reflow.
#[derive(Debug, Clone)]
pub struct EntryView {
    entry: Entry,
    layout: BoundingBox,
}

impl EntryView {
    /// Wrap an entry with an empty layout.
    pub fn new(entry: Entry) -> Self {
        Self {
            entry,
            layout: BoundingBox::default(),
        }
    }

    /// The entry.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub(crate) fn entry_mut(&mut self) -> &mut Entry {
        &mut self.entry
    }

    /// Give the entry back.
    pub fn into_entry(self) -> Entry {
        self.entry
    }

    /// Box as of the last flush.
    pub fn layout(&self) -> &BoundingBox {
        &self.layout
    }

    pub(crate) fn set_layout(&mut self, layout: BoundingBox) {
        self.layout = layout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryId, Side};

    #[test]
    fn new_view_has_default_layout() {
        let view = EntryView::new(Entry::text(EntryId::new("msg-1").unwrap(), Side::Left, "x"));
        assert_eq!(*view.layout(), BoundingBox::default());
    }

    #[test]
    fn set_layout_replaces_box() {
        let mut view = EntryView::new(Entry::text(EntryId::new("msg-1").unwrap(), Side::Left, "x"));
        view.set_layout(BoundingBox::new(0.0, 10.0, 20.0, 30.0));
        assert_eq!(view.layout().bottom(), 40.0);
    }
}
