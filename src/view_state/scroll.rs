//! Semantic scroll targets.

use super::types::ScrollMetrics;
use crate::model::EntryId;

/// Where the viewport should end up once a reconciliation settles.
///
/// A sum type that states scroll intent independent of the numbers it
/// resolves to:
/// - `Top`: offset 0
/// - `Bottom`: viewport bottom on content bottom
/// - `At`: an absolute offset
/// - `Anchored`: keep an entry at a fixed distance from the viewport top
/// - `Unchanged`: leave the offset alone
///
/// # Clamping Behavior
/// Every variant resolves into `[0, max(0, content - viewport)]`, so a
/// correction can never leave a blank viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScrollTarget {
    /// Offset zero.
    Top,
    /// Largest offset.
    Bottom,
    /// Absolute offset, clamped.
    At(f64),
    /// Keep an entry at a distance from the viewport top.
    Anchored {
        /// Entry to keep in place.
        id: EntryId,
        /// Distance from the viewport top.
        offset_from_top: f64,
    },
    /// Leave the offset alone.
    #[default]
    Unchanged,
}

impl ScrollTarget {
    /// Resolve to an absolute, clamped offset.
    ///
    /// `entry_top` looks up an entry's current top. An `Anchored` target
    /// whose entry is gone resolves like `Unchanged`.
    pub fn resolve<F>(&self, metrics: &ScrollMetrics, entry_top: F) -> f64
    where
        F: Fn(&EntryId) -> Option<f64>,
    {
        let raw = match self {
            Self::Top => 0.0,
            Self::Bottom => metrics.max_offset(),
            Self::At(offset) => *offset,
            Self::Anchored {
                id,
                offset_from_top,
            } => match entry_top(id) {
                Some(top) => top - offset_from_top,
                None => metrics.scroll_offset,
            },
            Self::Unchanged => metrics.scroll_offset,
        };
        metrics.clamp(raw)
    }
}
