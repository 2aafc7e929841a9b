//! Scroll reconciler state machine.
//!
//! ```text
//! Idle → Capturing → Mutating → AwaitingSettlement → Correcting → Idle
//! ```
//!
//! One batch is in flight at a time. Batches submitted meanwhile wait in a
//! FIFO queue and start only after the flight has written its correction.
//! Capturing and Mutating always complete within the call that starts
//! them; only AwaitingSettlement can span frames, while media settles or
//! while the fast-scroll animation holds the scroll writer.

use super::animation::{ScrollLock, ScrollWriter};
use super::applier;
use super::policy::{InsertionPolicy, Placement};
use super::settlement::SettlementCoordinator;
use crate::model::{Entry, EntryId, EntryKind, ListError, Location};
use crate::view_state::{
    capture_anchor, resolve_anchor_delta, AnchorDelta, AnchorRef, LayoutProbe, LayoutTree,
    ProbeSnapshot, ScrollTarget,
};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use tracing::{debug, trace};

/// Reconciler phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Recording the pre-state.
    Capturing,
    /// Applying the batch.
    Mutating,
    /// Waiting for media or for the scroll writer.
    AwaitingSettlement,
    /// Writing the scroll correction.
    Correcting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Mutating => "mutating",
            Self::AwaitingSettlement => "awaiting_settlement",
            Self::Correcting => "correcting",
        };
        f.write_str(name)
    }
}

/// Entries to insert together, already carrying their ids.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Entries in request order.
    pub entries: Vec<Entry>,
    /// End they go to.
    pub location: Location,
}

/// Everything the reconciler touches while it runs a step.
pub struct ReconcileContext<'a, T: ?Sized> {
    /// Tree being reconciled.
    pub tree: &'a mut T,
    /// Placement and eviction decisions.
    pub policy: &'a mut InsertionPolicy,
    /// Media sizing.
    pub settlement: &'a SettlementCoordinator,
    /// Pinned-to-bottom test.
    pub probe: &'a LayoutProbe,
    /// Scroll-writer role.
    pub lock: &'a mut ScrollLock,
}

/// State of the batch in flight.
#[derive(Debug, Clone)]
struct Flight {
    ids: Vec<EntryId>,
    placement: Placement,
    snapshot: ProbeSnapshot,
    anchor: Option<AnchorRef>,
    pending: BTreeSet<EntryId>,
    waited_frames: u32,
}

/// Serializes insertions and computes their scroll corrections.
#[derive(Debug, Clone)]
pub struct Reconciler {
    phase: Phase,
    queue: VecDeque<Batch>,
    flight: Option<Flight>,
    timeout_frames: u32,
    completed: u64,
}

impl Reconciler {
    /// Reconciler failing unsettled assets after `timeout_frames` ticks (at least one).
    pub fn new(timeout_frames: u32) -> Self {
        Self {
            phase: Phase::Idle,
            queue: VecDeque::new(),
            flight: None,
            timeout_frames: timeout_frames.max(1),
            completed: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// No flight and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle && self.queue.is_empty()
    }

    /// Batches waiting behind the flight.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Reconciliations finished so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Ids of the batch in flight.
    pub fn in_flight(&self) -> &[EntryId] {
        self.flight.as_ref().map_or(&[], |f| f.ids.as_slice())
    }

    /// Media entries of the flight still waiting for their asset.
    pub fn pending(&self) -> impl Iterator<Item = &EntryId> {
        self.flight.iter().flat_map(|f| f.pending.iter())
    }

    /// Whether a mutation may start right now.
    ///
    /// # Errors
    /// `ListError::ConcurrentMutation` while a reconciliation is in flight
    /// or queued. The caller queues instead of failing.
    pub fn check_idle(&self) -> Result<(), ListError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(ListError::ConcurrentMutation {
                phase: self.phase.to_string(),
            })
        }
    }

    /// Mutable access to an entry of a batch still waiting in the queue.
    pub fn queued_entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.queue
            .iter_mut()
            .flat_map(|batch| batch.entries.iter_mut())
            .find(|entry| entry.id() == id)
    }

    /// Add a batch behind the flight and any earlier batches.
    pub fn enqueue(&mut self, batch: Batch) {
        self.queue.push_back(batch);
    }

    /// Run the state machine as far as it can go without waiting.
    pub fn pump<T: LayoutTree + ?Sized>(&mut self, ctx: &mut ReconcileContext<'_, T>) {
        loop {
            if self.flight.is_none() {
                let Some(batch) = self.queue.pop_front() else {
                    self.transition(Phase::Idle);
                    return;
                };
                self.begin(batch, ctx);
            }
            if !self.try_correct(ctx) {
                return;
            }
        }
    }

    /// Record that a media entry settled.
    pub fn mark_settled(&mut self, id: &EntryId) -> bool {
        self.flight
            .as_mut()
            .is_some_and(|flight| flight.pending.remove(id))
    }

    /// Advance the settlement clock by one frame.
    ///
    /// Returns the entries whose assets have now timed out.
    pub fn tick(&mut self) -> Vec<EntryId> {
        let Some(flight) = self.flight.as_mut() else {
            return Vec::new();
        };
        if flight.pending.is_empty() {
            return Vec::new();
        }
        flight.waited_frames += 1;
        if flight.waited_frames >= self.timeout_frames {
            flight.pending.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Re-capture the pre-state of the flight from the current layout.
    ///
    /// Called when something other than the flight moved the viewport (user
    /// scroll, the end of an animation, a resize) so the final correction is
    /// based on where the viewport is now.
    pub fn rebase<T: LayoutTree + ?Sized>(&mut self, ctx: &mut ReconcileContext<'_, T>) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        ctx.tree.flush_layout();
        flight.snapshot = ctx.probe.snapshot(&*ctx.tree);
        flight.anchor = capture_anchor(&*ctx.tree);
        flight.placement = ctx.policy.decide(flight.placement.location, &flight.snapshot);
        debug!(
            scroll_offset = flight.snapshot.metrics.scroll_offset,
            pinned = flight.snapshot.pinned,
            anchor = ?flight.anchor.as_ref().map(|a| a.id.as_str()),
            "Rebased in-flight reconciliation"
        );
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            debug!(from = %self.phase, to = %to, "Reconciler phase");
            self.phase = to;
        }
    }

    fn begin<T: LayoutTree + ?Sized>(&mut self, batch: Batch, ctx: &mut ReconcileContext<'_, T>) {
        self.transition(Phase::Capturing);
        ctx.tree.flush_layout();
        let snapshot = ctx.probe.snapshot(&*ctx.tree);
        let anchor = capture_anchor(&*ctx.tree);
        let placement = ctx.policy.decide(batch.location, &snapshot);
        let kinds: Vec<EntryKind> = batch.entries.iter().map(Entry::kind).collect();
        let victims = ctx.policy.plan_eviction(
            &*ctx.tree,
            placement.location,
            &kinds,
            anchor.as_ref().map(|a| &a.id),
        );
        trace!(?snapshot, ?anchor, ?placement, "Captured pre-state");

        self.transition(Phase::Mutating);
        let viewport = ctx.tree.viewport();
        let mut entries = batch.entries;
        for media in entries.iter_mut().filter_map(Entry::media_mut) {
            ctx.settlement.refit(media, viewport);
        }
        let ids: Vec<EntryId> = entries.iter().map(|e| e.id().clone()).collect();
        let pending: BTreeSet<EntryId> = entries
            .iter()
            .filter(|e| e.is_pending())
            .map(|e| e.id().clone())
            .collect();

        applier::apply(&mut *ctx.tree, entries, placement.location);
        let evicted: Vec<EntryId> = applier::evict(&mut *ctx.tree, &victims)
            .iter()
            .map(|e| e.id().clone())
            .collect();
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted entries");
            ctx.policy.forget(&evicted);
        }
        ctx.tree.flush_layout();

        self.flight = Some(Flight {
            ids,
            placement,
            snapshot,
            anchor,
            pending,
            waited_frames: 0,
        });
        self.transition(Phase::AwaitingSettlement);
    }

    /// Write the correction if the flight is settled and the scroll writer
    /// is free. Returns whether the flight finished.
    fn try_correct<T: LayoutTree + ?Sized>(&mut self, ctx: &mut ReconcileContext<'_, T>) -> bool {
        match self.flight.as_ref() {
            None => return true,
            Some(flight) if !flight.pending.is_empty() => return false,
            Some(_) => {}
        }
        if !ctx.lock.try_acquire(ScrollWriter::Reconciler) {
            trace!(holder = ?ctx.lock.holder(), "Correction waits for scroll writer");
            return false;
        }
        let Some(flight) = self.flight.take() else {
            return true;
        };

        self.transition(Phase::Correcting);
        ctx.tree.flush_layout();
        let target = correction(&flight, &*ctx.tree);
        let metrics = ctx.tree.metrics();
        let offset = target.resolve(&metrics, |id| ctx.tree.measure(id).map(|b| b.top));
        ctx.tree.set_scroll_offset(offset);
        ctx.lock.release(ScrollWriter::Reconciler);
        debug!(?target, from = metrics.scroll_offset, to = offset, "Applied scroll correction");

        self.completed += 1;
        self.transition(Phase::Idle);
        true
    }
}

/// Correction for a settled flight.
///
/// Pinned flights follow the bottom. Otherwise the anchor's movement is
/// added to the captured offset; a lost anchor falls back to the bottom if
/// the pre-state was pinned and to no correction if it was not.
fn correction<T: LayoutTree + ?Sized>(flight: &Flight, tree: &T) -> ScrollTarget {
    if flight.placement.pin {
        return ScrollTarget::Bottom;
    }
    let Some(anchor) = flight.anchor.as_ref() else {
        return ScrollTarget::Unchanged;
    };
    match resolve_anchor_delta(tree, anchor) {
        AnchorDelta::Shift(delta) => ScrollTarget::At(flight.snapshot.metrics.scroll_offset + delta),
        AnchorDelta::Lost if flight.snapshot.pinned => ScrollTarget::Bottom,
        AnchorDelta::Lost => ScrollTarget::Unchanged,
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
