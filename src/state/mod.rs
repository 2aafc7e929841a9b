//! Reconciliation core (pure).
//!
//! Everything here runs without a terminal: the chat list, the insertion
//! state machine and the checks over its output are all testable against
//! an in-memory layout tree.

pub mod animation;
pub mod applier;
pub mod chat_list;
pub mod policy;
pub mod reconciler;
pub mod settlement;
pub mod validate;

pub use animation::{FastScroll, ScrollLock, ScrollWriter};
pub use chat_list::{AssetRequest, ChatList, ListConfig, DEFAULT_ASSET_TIMEOUT_FRAMES};
pub use policy::{EvictionCaps, HeaderLookup, InsertionPolicy, Placement};
pub use reconciler::{Batch, Phase, ReconcileContext, Reconciler};
pub use settlement::{MediaPolicy, Readiness, SettlementCoordinator};
pub use validate::{
    AspectRatioReport, CheckResult, CheckStatus, DuplicateId, EntrySnapshot, Overlap,
    ValidationReport, DEFAULT_ASPECT_TOLERANCE_PERCENT,
};
