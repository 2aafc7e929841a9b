//! chatscroll
//!
//! Scroll-anchored incremental insertion for a chat-style list. Entries
//! arrive at either end while the reader's position is preserved:
//! a reader at the bottom follows new content, a reader in history keeps
//! the same entry at the same screen offset, and media settle from a
//! placeholder to their final size without visible jumps.
//!
//! The pure core (`model`, `view_state`, `state`) is driven by an impure
//! shell (`view`, `source`, `logging`, `config`).

pub mod config;
pub mod logging;
pub mod model;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;

// Headless validation run behind `--check`
pub mod integration;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
