//! Layout probe: read-only scroll metrics and the pinned-to-bottom test.

use super::tree::LayoutTree;
use super::types::ScrollMetrics;
use serde::Serialize;

/// Default pinned-to-bottom tolerance in layout units.
pub const DEFAULT_BOTTOM_TOLERANCE: f64 = 10.0;

/// Metrics plus the pin classification, taken together before a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeSnapshot {
    /// Scroll state at capture.
    pub metrics: ScrollMetrics,
    /// Whether the viewport was pinned to the bottom.
    pub pinned: bool,
}

/// Pure reader of container scroll state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutProbe {
    tolerance: f64,
}

impl Default for LayoutProbe {
    fn default() -> Self {
        Self::new(DEFAULT_BOTTOM_TOLERANCE)
    }
}

impl LayoutProbe {
    /// Probe with a pinned-to-bottom tolerance. Negative values count as zero.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
        }
    }

    /// Pinned-to-bottom tolerance in layout units.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Current scroll metrics of a tree.
    pub fn measure<T: LayoutTree + ?Sized>(&self, tree: &T) -> ScrollMetrics {
        tree.metrics()
    }

    /// `content - scroll - viewport <= tolerance`.
    pub fn is_pinned_to_bottom(&self, metrics: &ScrollMetrics) -> bool {
        metrics.distance_from_bottom() <= self.tolerance
    }

    /// Metrics plus the pinned decision.
    pub fn snapshot<T: LayoutTree + ?Sized>(&self, tree: &T) -> ProbeSnapshot {
        let metrics = self.measure(tree);
        ProbeSnapshot {
            metrics,
            pinned: self.is_pinned_to_bottom(&metrics),
        }
    }
}
