//! Asset sources.
//!
//! This module provides the producers of asset events that settle media
//! entries:
//! - The `AssetSource` trait the list drives once per frame
//! - `SimulatedAssets`, which decodes sizes from `sim:WxH` references

use crate::model::{AssetRef, EntryId};

pub mod simulated;

pub use simulated::SimulatedAssets;

/// Something an asset reported about a media entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEvent {
    /// The asset loaded with this intrinsic size.
    Ready {
        /// Media entry the asset belongs to.
        id: EntryId,
        /// Intrinsic width.
        width: f64,
        /// Intrinsic height.
        height: f64,
    },
    /// The asset could not be loaded.
    Failed {
        /// Entry whose asset failed.
        id: EntryId,
        /// Reason for the failure.
        reason: String,
    },
}

/// Loads assets for media entries.
///
/// # Contract
/// - `request` is called once per media entry when it enters the list
/// - `poll` is non-blocking and returns whatever finished since the last call
/// - an event for an id that was never requested is allowed (and ignored)
pub trait AssetSource {
    /// Start loading `asset` for entry `id`.
    fn request(&mut self, id: &EntryId, asset: &AssetRef);

    /// Events finished since the last poll.
    fn poll(&mut self) -> Vec<AssetEvent>;
}
