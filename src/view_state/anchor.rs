//! Anchor tracker.
//!
//! Before a mutation the topmost visible entry is recorded together with
//! its distance from the viewport top. After the mutation its new top tells
//! how far the content above it grew or shrank.

use super::tree::LayoutTree;
use crate::model::EntryId;
use serde::Serialize;

/// Reference entry recorded before a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorRef {
    /// Anchored entry.
    pub id: EntryId,
    /// Top of the entry in content coordinates at capture time.
    pub top: f64,
    /// `top - scroll_offset` at capture time.
    pub offset_from_top: f64,
}

/// Result of re-measuring an anchor after a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorDelta {
    /// Scroll correction that keeps the anchor stationary.
    Shift(f64),
    /// The anchor left the tree (evicted).
    Lost,
}

/// Select the anchor from the current (flushed) layout.
///
/// Picks the first entry whose top lies inside the visible band. When no
/// top does (one tall entry spans the viewport) the first intersecting
/// entry is used instead. Returns `None` for an empty viewport.
pub fn capture_anchor<T: LayoutTree + ?Sized>(tree: &T) -> Option<AnchorRef> {
    let metrics = tree.metrics();
    let band_top = metrics.scroll_offset;
    let band_bottom = metrics.visible_bottom();

    let mut first_intersecting: Option<AnchorRef> = None;

    for index in 0..tree.len() {
        let Some(entry) = tree.entry_at(index) else {
            continue;
        };
        let Some(layout) = tree.measure(entry.id()) else {
            continue;
        };
        if layout.top >= band_bottom {
            break;
        }
        if !layout.intersects_band(band_top, band_bottom) {
            continue;
        }

        let anchor = AnchorRef {
            id: entry.id().clone(),
            top: layout.top,
            offset_from_top: layout.top - band_top,
        };
        if layout.top >= band_top {
            return Some(anchor);
        }
        first_intersecting.get_or_insert(anchor);
    }

    first_intersecting
}

/// How far the anchor moved since capture.
pub fn resolve_anchor_delta<T: LayoutTree + ?Sized>(tree: &T, anchor: &AnchorRef) -> AnchorDelta {
    match tree.measure(&anchor.id) {
        Some(layout) => AnchorDelta::Shift(layout.top - anchor.top),
        None => AnchorDelta::Lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Side, TimeBucket};
    use crate::view_state::layout::FixedHeight;
    use crate::view_state::stack::StackLayout;
    use crate::view_state::types::Viewport;

    fn id(raw: &str) -> EntryId {
        EntryId::new(raw).unwrap()
    }

    /// Five 50-unit entries a..e in a 100-unit viewport.
    fn tree() -> StackLayout<FixedHeight> {
        let mut tree =
            StackLayout::with_measure(Viewport::new(400.0, 100.0), FixedHeight::new(40.0, 50.0));
        for name in ["a", "b", "c", "d", "e"] {
            tree.append_child(Entry::text(id(name), Side::Left, "x"));
        }
        tree.flush_layout();
        tree
    }

    #[test]
    fn picks_entry_whose_top_is_visible() {
        let mut tree = tree();
        tree.set_scroll_offset(60.0);

        let anchor = capture_anchor(&tree).unwrap();

        // b starts at 50 (above the band), c at 100
        assert_eq!(anchor.id, id("c"));
        assert_eq!(anchor.offset_from_top, 40.0);
    }

    #[test]
    fn entry_exactly_at_viewport_top_is_chosen() {
        let mut tree = tree();
        tree.set_scroll_offset(50.0);
        let anchor = capture_anchor(&tree).unwrap();
        assert_eq!(anchor.id, id("b"));
        assert_eq!(anchor.offset_from_top, 0.0);
    }

    #[test]
    fn falls_back_to_spanning_entry() {
        let mut tree =
            StackLayout::with_measure(Viewport::new(400.0, 100.0), FixedHeight::new(40.0, 500.0));
        tree.append_child(Entry::text(id("tall"), Side::Left, "x"));
        tree.flush_layout();
        tree.set_scroll_offset(200.0);

        let anchor = capture_anchor(&tree).unwrap();

        assert_eq!(anchor.id, id("tall"));
        assert_eq!(anchor.offset_from_top, -200.0);
    }

    #[test]
    fn empty_tree_has_no_anchor() {
        let tree = StackLayout::with_measure(Viewport::new(400.0, 100.0), FixedHeight::new(1.0, 1.0));
        assert_eq!(capture_anchor(&tree), None);
    }

    #[test]
    fn delta_reports_growth_above_anchor() {
        let mut tree = tree();
        tree.set_scroll_offset(60.0);
        let anchor = capture_anchor(&tree).unwrap();

        tree.insert_before(&id("a"), Entry::header(id("h"), TimeBucket::from_hm(8, 0).unwrap()))
            .unwrap();
        tree.flush_layout();

        assert_eq!(resolve_anchor_delta(&tree, &anchor), AnchorDelta::Shift(40.0));
    }

    #[test]
    fn growth_below_anchor_yields_zero_shift() {
        let mut tree = tree();
        tree.set_scroll_offset(60.0);
        let anchor = capture_anchor(&tree).unwrap();

        tree.append_child(Entry::text(id("f"), Side::Right, "x"));
        tree.flush_layout();

        assert_eq!(resolve_anchor_delta(&tree, &anchor), AnchorDelta::Shift(0.0));
    }

    #[test]
    fn removed_anchor_is_lost() {
        let mut tree = tree();
        tree.set_scroll_offset(60.0);
        let anchor = capture_anchor(&tree).unwrap();

        tree.remove_child(&anchor.id);
        tree.flush_layout();

        assert_eq!(resolve_anchor_delta(&tree, &anchor), AnchorDelta::Lost);
    }
}
