//! Core view-state geometry types.
//!
//! All values are layout units (think CSS pixels). The terminal demo maps
//! them onto cells; the core never rounds.

use serde::Serialize;

pub use crate::model::BoxSize;

/// Axis-aligned box of an entry, relative to the top of the content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    /// Distance from the container's left edge.
    pub left: f64,
    /// Distance from the content top.
    pub top: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl BoundingBox {
    /// Box from its position and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Lower edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Area shared with another box; zero when they only touch.
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    /// Whether the box intersects the half-open vertical band `[top, bottom)`.
    pub fn intersects_band(&self, top: f64, bottom: f64) -> bool {
        top < self.bottom() && self.top < bottom
    }
}

/// Scroll state of the list container.
///
/// # Invariants
/// - `0 <= scroll_offset <= max_offset()` once layout has been flushed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollMetrics {
    /// Distance from the top of the content to the top of the viewport.
    pub scroll_offset: f64,
    /// Total height of the content.
    pub content_extent: f64,
    /// Height of the visible viewport.
    pub viewport_extent: f64,
}

impl ScrollMetrics {
    /// Metrics from the three extents.
    pub fn new(scroll_offset: f64, content_extent: f64, viewport_extent: f64) -> Self {
        Self {
            scroll_offset,
            content_extent,
            viewport_extent,
        }
    }

    /// Largest valid scroll offset.
    pub fn max_offset(&self) -> f64 {
        (self.content_extent - self.viewport_extent).max(0.0)
    }

    /// Content remaining below the viewport's bottom edge.
    pub fn distance_from_bottom(&self) -> f64 {
        self.content_extent - self.scroll_offset - self.viewport_extent
    }

    /// Offset of the viewport's bottom edge.
    pub fn visible_bottom(&self) -> f64 {
        self.scroll_offset + self.viewport_extent
    }

    /// Clamp an offset into `[0, max_offset()]`.
    pub fn clamp(&self, offset: f64) -> f64 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.max_offset())
    }
}

/// Container dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
}

impl Viewport {
    /// Container of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
