//! In-memory vertical stack implementing [`LayoutTree`].

use super::entry_view::EntryView;
use super::layout::{Measure, TextMetrics};
use super::tree::LayoutTree;
use super::types::{BoundingBox, ScrollMetrics, Viewport};
use crate::model::{Entry, EntryId, Side};

/// Entries stacked top to bottom with a fixed gap between rows.
///
/// Contains:
/// - Owned entries with their last flushed layout
/// - Current scroll offset
/// - Cached content extent
/// - The index layout is invalid from (`dirty_from`)
///
/// # Layout Computation
/// `flush_layout` relays out from the first invalidated entry onward,
/// keeping `top[i] = bottom[i-1] + row_gap`. Messages are right-aligned
/// or left-aligned by side; headers span the container.
#[derive(Debug, Clone)]
pub struct StackLayout<M = TextMetrics> {
    nodes: Vec<EntryView>,
    measure: M,
    viewport: Viewport,
    row_gap: f64,
    scroll_offset: f64,
    content_extent: f64,
    dirty_from: Option<usize>,
}

impl StackLayout<TextMetrics> {
    /// Empty stack using the terminal box model.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_measure(viewport, TextMetrics)
    }
}

impl<M: Measure> StackLayout<M> {
    /// Empty stack with a custom box model.
    pub fn with_measure(viewport: Viewport, measure: M) -> Self {
        Self {
            nodes: Vec::new(),
            measure,
            viewport,
            row_gap: 0.0,
            scroll_offset: 0.0,
            content_extent: 0.0,
            dirty_from: None,
        }
    }

    /// Vertical gap between consecutive entries.
    pub fn with_row_gap(mut self, gap: f64) -> Self {
        self.row_gap = gap.max(0.0);
        self.invalidate(0);
        self
    }

    /// Vertical gap between entries.
    pub fn row_gap(&self) -> f64 {
        self.row_gap
    }

    /// Iterate entries with their layouts.
    pub fn views(&self) -> impl Iterator<Item = &EntryView> {
        self.nodes.iter()
    }

    /// Whether structural changes are waiting for a flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty_from.is_some()
    }

    /// Indices of entries intersecting the viewport. O(log n).
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        let top = self.scroll_offset;
        let bottom = top + self.viewport.height;
        let start = self.nodes.partition_point(|v| v.layout().bottom() <= top);
        let end = self.nodes.partition_point(|v| v.layout().top < bottom);
        start..end.max(start)
    }

    fn invalidate(&mut self, index: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(index, |d| d.min(index)));
    }

    fn place(&self, entry: &Entry, top: f64) -> BoundingBox {
        let container = self.viewport.width;
        let natural = self.measure.measure(entry, container);
        let width = natural.width.clamp(0.0, container.max(0.0));
        let height = if natural.height.is_finite() {
            natural.height.max(0.0)
        } else {
            0.0
        };
        let left = match entry.side() {
            Some(Side::Right) => container - width,
            Some(Side::Left) | None => 0.0,
        };
        BoundingBox::new(left, top, width, height)
    }
}

impl<M: Measure> LayoutTree for StackLayout<M> {
    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn entry_at(&self, index: usize) -> Option<&Entry> {
        self.nodes.get(index).map(EntryView::entry)
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.nodes.iter().position(|v| v.entry().id() == id)
    }

    fn insert_before(&mut self, reference: &EntryId, entry: Entry) -> Result<(), Entry> {
        let Some(index) = self.position(reference) else {
            return Err(entry);
        };
        self.nodes.insert(index, EntryView::new(entry));
        self.invalidate(index);
        Ok(())
    }

    fn append_child(&mut self, entry: Entry) {
        self.nodes.push(EntryView::new(entry));
        self.invalidate(self.nodes.len() - 1);
    }

    fn remove_child(&mut self, id: &EntryId) -> Option<Entry> {
        let index = self.position(id)?;
        let view = self.nodes.remove(index);
        self.invalidate(index);
        Some(view.into_entry())
    }

    fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        let index = self.position(id)?;
        self.invalidate(index);
        self.nodes.get_mut(index).map(EntryView::entry_mut)
    }

    fn measure(&self, id: &EntryId) -> Option<BoundingBox> {
        self.nodes
            .iter()
            .find(|v| v.entry().id() == id)
            .map(|v| *v.layout())
    }

    fn flush_layout(&mut self) {
        let Some(from) = self.dirty_from.take() else {
            return;
        };

        let mut top = match from {
            0 => 0.0,
            i => match self.nodes.get(i - 1) {
                Some(prev) => prev.layout().bottom() + self.row_gap,
                None => 0.0,
            },
        };

        for index in from..self.nodes.len() {
            let layout = self.place(self.nodes[index].entry(), top);
            top = layout.bottom() + self.row_gap;
            self.nodes[index].set_layout(layout);
        }

        self.content_extent = self.nodes.last().map_or(0.0, |v| v.layout().bottom());
        self.scroll_offset = self.metrics().clamp(self.scroll_offset);
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_offset, self.content_extent, self.viewport.height)
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = self.metrics().clamp(offset);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if !self.nodes.is_empty() {
            self.invalidate(0);
        }
    }
}
