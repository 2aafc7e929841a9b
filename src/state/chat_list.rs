//! The chat list: public face of the reconciliation core.

use super::animation::{FastScroll, ScrollLock, ScrollWriter};
use super::policy::{EvictionCaps, HeaderLookup, InsertionPolicy};
use super::reconciler::{Batch, Phase, ReconcileContext, Reconciler};
use super::settlement::{MediaPolicy, Readiness, SettlementCoordinator};
use super::validate::{
    self, AspectRatioReport, DuplicateId, EntrySnapshot, Overlap, ValidationReport,
    DEFAULT_ASPECT_TOLERANCE_PERCENT,
};
use crate::model::{
    AssetRef, BoxSize, Entry, EntryId, EntryKind, EntrySpec, IdAllocator, ListError, Location,
    Media, MediaSpec, Side, TimeBucket, PLACEHOLDER_TEXT,
};
use crate::source::{AssetEvent, AssetSource, SimulatedAssets};
use crate::view_state::{
    capture_anchor, LayoutProbe, LayoutTree, ScrollMetrics, ScrollTarget, StackLayout, Viewport,
    DEFAULT_BOTTOM_TOLERANCE,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info, trace, warn};

/// Frames a media entry may stay unsettled before the fallback is applied.
pub const DEFAULT_ASSET_TIMEOUT_FRAMES: u32 = 120;

/// Tunables of one list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Pinned-to-bottom tolerance in layout units.
    pub bottom_tolerance: f64,
    /// Allowed media ratio deviation reported by `validate`, in percent.
    pub aspect_tolerance_percent: f64,
    /// Media sizing limits.
    pub media: MediaPolicy,
    /// Frames before an unreported asset falls back.
    pub asset_timeout_frames: u32,
    /// Eviction caps; unbounded by default.
    pub caps: EvictionCaps,
    /// Seed for `insert_once`.
    pub seed: u64,
    /// Vertical gap between entries.
    pub row_gap: f64,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            bottom_tolerance: DEFAULT_BOTTOM_TOLERANCE,
            aspect_tolerance_percent: DEFAULT_ASPECT_TOLERANCE_PERCENT,
            media: MediaPolicy::default(),
            asset_timeout_frames: DEFAULT_ASSET_TIMEOUT_FRAMES,
            caps: EvictionCaps::default(),
            seed: 0,
            row_gap: 0.0,
        }
    }
}

/// An asset load the list wants started.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    /// Media entry waiting for the asset.
    pub id: EntryId,
    /// Asset to load.
    pub asset: AssetRef,
}

/// Chat-style list with scroll-anchored incremental insertion.
///
/// Owns the layout tree, the id allocator and every piece of reconciliation
/// state. All mutation of the entry sequence and every system write of the
/// scroll offset goes through here.
///
/// # Frames
/// Text-only insertions reconcile inside `insert_entry`. Media insertions
/// finish on a later `asset_ready`/`asset_failed` or on the `frame` that
/// times the asset out. Callers drive `frame` once per rendered frame.
#[derive(Clone)]
pub struct ChatList<T = StackLayout> {
    tree: T,
    ids: IdAllocator,
    policy: InsertionPolicy,
    settlement: SettlementCoordinator,
    probe: LayoutProbe,
    lock: ScrollLock,
    reconciler: Reconciler,
    animation: Option<FastScroll>,
    outbox: Vec<AssetRequest>,
    requested: HashSet<EntryId>,
    rng: StdRng,
    config: ListConfig,
    frames: u64,
}

impl ChatList<StackLayout> {
    /// Empty list over an in-memory stack.
    pub fn new(viewport: Viewport, config: ListConfig) -> Self {
        let tree = StackLayout::new(viewport).with_row_gap(config.row_gap);
        Self::with_tree(tree, config)
    }
}

impl<T: LayoutTree> ChatList<T> {
    /// List over an existing tree.
    ///
    /// Ids already in the tree are claimed so fresh ids never collide with
    /// them, and existing headers seed the dedup registry.
    pub fn with_tree(mut tree: T, config: ListConfig) -> Self {
        let mut ids = IdAllocator::new();
        let mut policy = InsertionPolicy::new(config.caps);
        let repeated = (0..tree.len())
            .filter_map(|index| tree.entry_at(index))
            .filter(|entry| ids.claim(entry.id().as_str()).is_err())
            .count();
        if repeated > 0 {
            rename_repeated_ids(&mut tree, &mut ids);
            warn!(count = repeated, "Existing tree carried repeated ids, renamed");
        }
        for index in 0..tree.len() {
            if let Some(entry) = tree.entry_at(index) {
                if let Some(bucket) = entry.bucket() {
                    policy.register_header(bucket, entry.id().clone());
                }
            }
        }
        tree.flush_layout();

        info!(
            entries = tree.len(),
            viewport_width = tree.viewport().width,
            viewport_height = tree.viewport().height,
            seed = config.seed,
            "Chat list created"
        );

        Self {
            tree,
            ids,
            policy,
            settlement: SettlementCoordinator::new(config.media),
            probe: LayoutProbe::new(config.bottom_tolerance),
            lock: ScrollLock::default(),
            reconciler: Reconciler::new(config.asset_timeout_frames),
            animation: None,
            outbox: Vec::new(),
            requested: HashSet::new(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            frames: 0,
        }
    }

    // ===== Insertion =====

    /// Insert one entry and return its id.
    ///
    /// Never fails: a colliding external id is replaced by a fresh one, a
    /// message without a body gets placeholder text, and a header for an
    /// existing time bucket returns that header's id without inserting.
    pub fn insert_entry(&mut self, spec: EntrySpec) -> EntryId {
        let location = InsertionPolicy::location(&spec);
        let (id, entry) = self.prepare(spec);
        self.submit(entry.into_iter().collect(), location);
        id
    }

    /// Insert several entries as one atomic batch at `location`.
    ///
    /// Ids are returned in request order. The per-spec location is ignored.
    pub fn insert_batch(&mut self, specs: Vec<EntrySpec>, location: Location) -> Vec<EntryId> {
        let mut ids = Vec::with_capacity(specs.len());
        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let (id, entry) = self.prepare(spec);
            ids.push(id);
            entries.extend(entry);
        }
        self.submit(entries, location);
        ids
    }

    /// One seeded-random insertion.
    ///
    /// About 30% of calls prepend a time header as historical content; the
    /// rest append a message, 40% of which carry a simulated image.
    pub fn insert_once(&mut self) -> EntryId {
        let spec = if self.rng.random_bool(0.3) {
            let hour = self.rng.random_range(9..=12);
            let minute = self.rng.random_range(0..60);
            match TimeBucket::from_hm(hour, minute) {
                Some(bucket) => EntrySpec::header(bucket).at(Location::Top),
                None => EntrySpec::text(Side::Left, PLACEHOLDER_TEXT).at(Location::Bottom),
            }
        } else {
            let side = if self.rng.random_bool(0.5) {
                Side::Left
            } else {
                Side::Right
            };
            let spec = if self.rng.random_bool(0.4) {
                let width = self.rng.random_range(150..350);
                let height = self.rng.random_range(100..300);
                EntrySpec::media(side, MediaSpec::new(SimulatedAssets::reference(width, height)))
            } else {
                let n: u32 = self.rng.random_range(0..100);
                EntrySpec::text(side, format!("{PLACEHOLDER_TEXT} {n}"))
            };
            spec.at(Location::Bottom)
        };
        self.insert_entry(spec)
    }

    /// Resolve a spec to its id and, unless it deduplicates to an existing
    /// header, a new entry.
    fn prepare(&mut self, spec: EntrySpec) -> (EntryId, Option<Entry>) {
        if let HeaderLookup::Existing(id) = self.policy.lookup_header(&spec) {
            debug!(id = %id, "Header bucket already present");
            return (id, None);
        }

        let id = match spec.id.as_deref() {
            Some(raw) => match self.ids.claim(raw) {
                Ok(id) => id,
                Err(err) => {
                    let id = self.ids.allocate(spec.id_prefix());
                    warn!(error = %err, replacement = %id, "Rejected external id");
                    id
                }
            },
            None => self.ids.allocate(spec.id_prefix()),
        };

        let entry = match spec.kind {
            EntryKind::Header => match spec.bucket {
                Some(bucket) => {
                    self.policy.register_header(bucket, id.clone());
                    Entry::header(id.clone(), bucket)
                }
                None => Entry::labelled_header(id.clone(), spec.text.clone().unwrap_or_default()),
            },
            EntryKind::Message => {
                let side = spec.side.unwrap_or(Side::Left);
                if let Err(err) = spec.validate() {
                    warn!(error = %err, id = %id, "Using placeholder text");
                }
                match (spec.media, spec.text) {
                    (Some(media), _) => {
                        let descriptor = media.descriptor();
                        let placeholder = self.settlement.reserve(&descriptor, self.tree.viewport());
                        Entry::media_message(id.clone(), side, descriptor, placeholder)
                    }
                    (None, Some(text)) => Entry::text(id.clone(), side, text),
                    (None, None) => Entry::text(id.clone(), side, PLACEHOLDER_TEXT),
                }
            }
        };
        (id, Some(entry))
    }

    fn submit(&mut self, entries: Vec<Entry>, location: Location) {
        if entries.is_empty() {
            return;
        }
        if let Err(err) = self.reconciler.check_idle() {
            debug!(error = %err, queued = self.reconciler.queued() + 1, "Queued insertion");
        }
        self.reconciler.enqueue(Batch { entries, location });
        self.pump();
    }

    // ===== Asset events =====

    /// The asset of a media entry loaded. Repeated reports are no-ops.
    ///
    /// Media still queued behind another flight settle in place and enter
    /// the tree already final.
    pub fn asset_ready(&mut self, id: &EntryId, width: f64, height: f64) {
        let viewport = self.tree.viewport();
        let Some(media) = pending_media(&mut self.tree, &mut self.reconciler, id) else {
            trace!(id = %id, "Ignoring ready event for settled or unknown entry");
            return;
        };
        match self
            .settlement
            .on_asset_ready(id, media, BoxSize::new(width, height), viewport)
        {
            Ok(Readiness::Settled(shown)) => {
                debug!(id = %id, width = shown.width, height = shown.height, "Media settled");
            }
            Ok(Readiness::AlreadySettled) => {}
            Err(err) => {
                warn!(error = %err, "Applying fallback box");
                self.settlement.on_asset_failed(media, viewport);
            }
        }
        self.settled(id);
        self.pump();
    }

    /// The asset of a media entry failed; the fallback box is applied.
    pub fn asset_failed(&mut self, id: &EntryId, reason: &str) {
        self.fail_asset(id, reason);
        self.pump();
    }

    fn fail_asset(&mut self, id: &EntryId, reason: &str) {
        let viewport = self.tree.viewport();
        let Some(media) = pending_media(&mut self.tree, &mut self.reconciler, id) else {
            trace!(id = %id, "Ignoring failure for settled or unknown entry");
            return;
        };
        let err = ListError::AssetLoadFailure {
            id: id.clone(),
            reason: reason.to_string(),
        };
        warn!(error = %err, "Applying fallback box");
        self.settlement.on_asset_failed(media, viewport);
        self.settled(id);
    }

    fn settled(&mut self, id: &EntryId) {
        self.requested.remove(id);
        self.reconciler.mark_settled(id);
    }

    /// Asset loads requested since the last call.
    pub fn take_asset_requests(&mut self) -> Vec<AssetRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Run one frame against an asset source: forward requests, deliver
    /// events, tick.
    pub fn drive<S: AssetSource + ?Sized>(&mut self, source: &mut S) {
        for request in self.take_asset_requests() {
            source.request(&request.id, &request.asset);
        }
        for event in source.poll() {
            match event {
                AssetEvent::Ready { id, width, height } => self.asset_ready(&id, width, height),
                AssetEvent::Failed { id, reason } => self.asset_failed(&id, &reason),
            }
        }
        self.frame();
        for request in self.take_asset_requests() {
            source.request(&request.id, &request.asset);
        }
    }

    // ===== Frames and scrolling =====

    /// Scheduler tick: animation step, asset time-outs, reconciliation.
    pub fn frame(&mut self) {
        self.frames += 1;

        if let Some(animation) = self.animation.as_mut() {
            self.tree.flush_layout();
            if animation.step(&mut self.tree) {
                self.animation = None;
                self.lock.release(ScrollWriter::Animation);
                debug!(frame = self.frames, "Fast scroll finished");
                self.rebase();
            }
        }

        let expired = self.reconciler.tick();
        if !expired.is_empty() {
            let reason = format!("no response after {} frames", self.config.asset_timeout_frames);
            for id in &expired {
                self.fail_asset(id, &reason);
            }
        }

        self.pump();
    }

    /// User scroll by `dy` layout units (positive is down).
    pub fn scroll_by(&mut self, dy: f64) {
        self.tree.flush_layout();
        let current = self.tree.metrics().scroll_offset;
        self.tree.set_scroll_offset(current + dy);
        self.rebase();
    }

    /// User scroll to the oldest entry.
    pub fn scroll_to_top(&mut self) {
        self.tree.flush_layout();
        self.tree.set_scroll_offset(0.0);
        self.rebase();
    }

    /// User scroll to the newest entry.
    pub fn scroll_to_bottom(&mut self) {
        self.tree.flush_layout();
        let bottom = self.tree.metrics().max_offset();
        self.tree.set_scroll_offset(bottom);
        self.rebase();
    }

    /// Start the top/bottom toggling animation for `toggles` frames.
    ///
    /// Returns `false` if an animation is already running or the scroll
    /// writer is taken.
    pub fn start_fast_scroll(&mut self, toggles: u32) -> bool {
        if toggles == 0 {
            return false;
        }
        if self.animation.is_some() {
            debug!("Fast scroll already running");
            return false;
        }
        if !self.lock.try_acquire(ScrollWriter::Animation) {
            warn!(holder = ?self.lock.holder(), "Scroll writer busy, fast scroll not started");
            return false;
        }
        self.animation = Some(FastScroll::new(toggles));
        debug!(toggles, "Fast scroll started");
        true
    }

    /// Whether the fast scroll runs.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Resize the container.
    ///
    /// Media boxes are re-fit to the new limits and the viewport keeps its
    /// anchor (or stays pinned).
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width.max(0.0), height.max(0.0));
        if viewport == self.tree.viewport() {
            return;
        }

        self.tree.flush_layout();
        let snapshot = self.probe.snapshot(&self.tree);
        let anchor = capture_anchor(&self.tree);

        self.tree.set_viewport(viewport);
        let media_ids: Vec<EntryId> = (0..self.tree.len())
            .filter_map(|i| self.tree.entry_at(i))
            .filter(|e| e.media().is_some())
            .map(|e| e.id().clone())
            .collect();
        for id in &media_ids {
            if let Some(media) = self.tree.entry_mut(id).and_then(Entry::media_mut) {
                self.settlement.refit(media, viewport);
            }
        }
        self.tree.flush_layout();

        let target = if snapshot.pinned {
            ScrollTarget::Bottom
        } else {
            anchor
                .map(|a| ScrollTarget::Anchored {
                    id: a.id,
                    offset_from_top: a.offset_from_top,
                })
                .unwrap_or_default()
        };
        if self.lock.try_acquire(ScrollWriter::Reconciler) {
            let metrics = self.tree.metrics();
            let offset = target.resolve(&metrics, |id| self.tree.measure(id).map(|b| b.top));
            self.tree.set_scroll_offset(offset);
            self.lock.release(ScrollWriter::Reconciler);
        }
        debug!(width, height, ?target, "Viewport resized");
        self.rebase();
    }

    fn context(&mut self) -> (&mut Reconciler, ReconcileContext<'_, T>) {
        (
            &mut self.reconciler,
            ReconcileContext {
                tree: &mut self.tree,
                policy: &mut self.policy,
                settlement: &self.settlement,
                probe: &self.probe,
                lock: &mut self.lock,
            },
        )
    }

    fn pump(&mut self) {
        let (reconciler, mut ctx) = self.context();
        reconciler.pump(&mut ctx);
        self.collect_asset_requests();
    }

    fn rebase(&mut self) {
        let (reconciler, mut ctx) = self.context();
        reconciler.rebase(&mut ctx);
    }

    fn collect_asset_requests(&mut self) {
        for id in self.reconciler.pending() {
            if !self.requested.insert(id.clone()) {
                continue;
            }
            if let Some(media) = self.tree.entry(id).and_then(Entry::media) {
                self.outbox.push(AssetRequest {
                    id: id.clone(),
                    asset: media.descriptor().asset_ref.clone(),
                });
            }
        }
    }

    /// Bring geometry up to date, e.g. before rendering.
    pub fn flush_layout(&mut self) {
        self.tree.flush_layout();
    }

    // ===== Read side =====

    /// Ordered snapshot of every entry with its box.
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        validate::snapshot(&self.tree)
    }

    /// Ids present more than once.
    pub fn check_duplicate_ids(&self) -> Vec<DuplicateId> {
        validate::check_duplicate_ids(&self.entries())
    }

    /// Pairs of entries whose boxes intersect.
    pub fn check_overlaps(&self) -> Vec<Overlap> {
        validate::check_overlaps(&self.entries())
    }

    /// Display ratio of every settled image against its intrinsic ratio.
    pub fn check_aspect_ratios(&self) -> Vec<AspectRatioReport> {
        validate::check_aspect_ratios(&self.tree)
    }

    /// All structural checks in one report.
    pub fn validate(&self) -> ValidationReport {
        validate::validate(&self.tree, self.config.aspect_tolerance_percent)
    }

    /// Reconciler phase.
    pub fn phase(&self) -> Phase {
        self.reconciler.phase()
    }

    /// No flight, no queue.
    pub fn is_idle(&self) -> bool {
        self.reconciler.is_idle()
    }

    /// Scroll metrics as of the last layout flush.
    pub fn metrics(&self) -> ScrollMetrics {
        self.tree.metrics()
    }

    /// Whether the viewport follows the bottom.
    pub fn is_pinned_to_bottom(&self) -> bool {
        self.probe.is_pinned_to_bottom(&self.tree.metrics())
    }

    /// Batches waiting behind the flight.
    pub fn queued(&self) -> usize {
        self.reconciler.queued()
    }

    /// Media of the flight still waiting for their asset.
    pub fn pending_assets(&self) -> usize {
        self.reconciler.pending().count()
    }

    /// Frames driven so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The layout tree.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Configuration the list was built with.
    pub fn config(&self) -> &ListConfig {
        &self.config
    }
}

/// Pending media entry by id, whether already in the tree or still queued.
fn pending_media<'a, T: LayoutTree>(
    tree: &'a mut T,
    reconciler: &'a mut Reconciler,
    id: &EntryId,
) -> Option<&'a mut Media> {
    let entry = if tree.entry(id).is_some() {
        tree.entry_mut(id)
    } else {
        reconciler.queued_entry_mut(id)
    };
    entry
        .and_then(Entry::media_mut)
        .filter(|media| media.settlement().is_pending())
}

/// Give every repeat of an id after its first occurrence a fresh id.
///
/// `ids` must already hold every id of the tree.
fn rename_repeated_ids<T: LayoutTree>(tree: &mut T, ids: &mut IdAllocator) {
    let mut drained = Vec::with_capacity(tree.len());
    while let Some(first) = tree.first_id() {
        match tree.remove_child(&first) {
            Some(entry) => drained.push(entry),
            None => break,
        }
    }
    let mut seen = HashSet::new();
    for entry in drained {
        let entry = if seen.insert(entry.id().clone()) {
            entry
        } else {
            let fresh = ids.allocate(entry.id_prefix());
            warn!(repeated = %entry.id(), replacement = %fresh, "Renamed repeated id");
            entry.with_id(fresh)
        };
        tree.append_child(entry);
    }
}

#[cfg(test)]
#[path = "chat_list_tests.rs"]
mod tests;
