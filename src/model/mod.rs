//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod entry;
pub mod error;
pub mod identifiers;
pub mod key_action;
pub mod spec;

// Re-export for convenience
pub use entry::{
    AssetRef, BoxSize, Content, Entry, EntryKind, Media, MediaDescriptor, SettleOutcome,
    Settlement, Side, SizeState, TimeBucket,
};
pub use error::{AppError, ListError};
pub use identifiers::{EntryId, IdAllocator, InvalidEntryId};
pub use key_action::KeyAction;
pub use spec::{EntrySpec, Location, MediaSpec, PLACEHOLDER_TEXT};
