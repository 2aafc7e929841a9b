//! Mutation applier.
//!
//! The only code that changes entry order. A batch is applied in one call
//! with no layout flush in between, so no reader ever observes a partially
//! inserted batch.

use crate::model::{Entry, EntryId, Location};
use crate::view_state::LayoutTree;
use tracing::warn;

/// Insert `entries` at `location`, keeping their relative order.
///
/// `Top` inserts each entry before the entry that was first when the batch
/// began, so `[a, b]` lands as `a, b, <old first>, ...`. Existing entries
/// are never touched.
pub fn apply<T: LayoutTree + ?Sized>(tree: &mut T, entries: Vec<Entry>, location: Location) {
    match location {
        Location::Bottom => {
            for entry in entries {
                tree.append_child(entry);
            }
        }
        Location::Top => {
            let Some(first) = tree.first_id() else {
                for entry in entries {
                    tree.append_child(entry);
                }
                return;
            };
            for entry in entries {
                if let Err(entry) = tree.insert_before(&first, entry) {
                    warn!(reference = %first, id = %entry.id(), "Insert reference vanished, appending");
                    tree.append_child(entry);
                }
            }
        }
    }
}

/// Remove entries by id, returning the ones that were present.
pub fn evict<T: LayoutTree + ?Sized>(tree: &mut T, ids: &[EntryId]) -> Vec<Entry> {
    ids.iter().filter_map(|id| tree.remove_child(id)).collect()
}
