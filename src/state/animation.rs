//! Fast-scroll animation and the scroll-writer lock.
//!
//! Within one tick at most one party may write the scroll offset on behalf
//! of the system: the running animation or the reconciler's correction.
//! The animation is never blocked; a correction that finds the lock held
//! waits for the animation to finish.

use crate::view_state::LayoutTree;
use serde::Serialize;
use std::fmt;

/// Who holds the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollWriter {
    /// The fast-scroll animation.
    Animation,
    /// A reconciliation writing its correction.
    Reconciler,
}

impl fmt::Display for ScrollWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animation => f.write_str("animation"),
            Self::Reconciler => f.write_str("reconciler"),
        }
    }
}

/// Exclusive scroll-writer role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollLock {
    holder: Option<ScrollWriter>,
}

impl ScrollLock {
    /// Take the role. Succeeds if free or already held by `writer`.
    pub fn try_acquire(&mut self, writer: ScrollWriter) -> bool {
        match self.holder {
            None => {
                self.holder = Some(writer);
                true
            }
            Some(current) => current == writer,
        }
    }

    /// Give the role back. A release by a non-holder is ignored.
    pub fn release(&mut self, writer: ScrollWriter) {
        if self.holder == Some(writer) {
            self.holder = None;
        }
    }

    /// Current holder, if any.
    pub fn holder(&self) -> Option<ScrollWriter> {
        self.holder
    }

    /// Whether nobody holds the role.
    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }
}

/// Toggles the viewport between bottom and top once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastScroll {
    total: u32,
    done: u32,
}

impl FastScroll {
    /// Animation of `toggles` frames. The first frame jumps to the bottom.
    pub fn new(toggles: u32) -> Self {
        Self {
            total: toggles,
            done: 0,
        }
    }

    /// Frames left to run.
    pub fn remaining(&self) -> u32 {
        self.total - self.done
    }

    /// Whether every frame ran.
    pub fn is_finished(&self) -> bool {
        self.done >= self.total
    }

    /// Advance one frame. Returns `true` once the last toggle was written.
    pub fn step<T: LayoutTree + ?Sized>(&mut self, tree: &mut T) -> bool {
        if self.is_finished() {
            return true;
        }
        let target = if self.done % 2 == 0 {
            tree.metrics().max_offset()
        } else {
            0.0
        };
        tree.set_scroll_offset(target);
        self.done += 1;
        self.is_finished()
    }
}
