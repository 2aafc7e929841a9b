//! View-state layer - Layout, scrolling, and anchoring
//!
//! This module holds everything geometric: the box model, the layout tree
//! the reconciliation core runs against, and the read-side helpers that
//! measure it.
//!
//! # Module Structure
//!
//! - `types`: Geometry types (BoundingBox, ScrollMetrics, Viewport)
//! - `layout`: Measure - natural box model of an entry
//! - `entry_view`: EntryView - owned entry with its flushed layout
//! - `tree`: LayoutTree - minimal tree interface
//! - `stack`: StackLayout - in-memory vertical stack
//! - `probe`: LayoutProbe - scroll metrics and pinned-to-bottom test
//! - `anchor`: Anchor capture and re-measurement
//! - `scroll`: ScrollTarget - semantic, clamped scroll intent

pub mod anchor;
pub mod entry_view;
pub mod layout;
pub mod probe;
pub mod scroll;
pub mod stack;
pub mod tree;
pub mod types;

pub use anchor::{capture_anchor, resolve_anchor_delta, AnchorDelta, AnchorRef};
pub use entry_view::EntryView;
pub use layout::{FixedHeight, Measure, TextMetrics};
pub use probe::{LayoutProbe, ProbeSnapshot, DEFAULT_BOTTOM_TOLERANCE};
pub use scroll::ScrollTarget;
pub use stack::StackLayout;
pub use tree::LayoutTree;
pub use types::{BoundingBox, BoxSize, ScrollMetrics, Viewport};
