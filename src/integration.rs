//! Headless validation run.
//!
//! Drives a chat list through seeded random insertions and the fast-scroll
//! stress, settles every asset, and reports the structural checks as JSON.
//! Used by `chatscroll --check N`; testable without a terminal.

use crate::model::Content;
use crate::source::SimulatedAssets;
use crate::state::{ChatList, CheckResult, ListConfig, ValidationReport};
use crate::view_state::{LayoutTree, ScrollMetrics, Viewport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Insertions performed after the fast scroll starts.
pub const INSERTS_DURING_FAST_SCROLL: usize = 6;

/// Parameters of one headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOptions {
    /// Seeded random insertions to perform.
    pub inserts: usize,
    /// Container size of the headless list.
    pub viewport: Viewport,
    /// Frames the simulated assets take to report.
    pub asset_latency_frames: u32,
    /// Zero skips the fast-scroll phase.
    pub fast_scroll_toggles: u32,
    /// Frames allowed for everything to settle at the end.
    pub settle_frame_budget: u32,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            inserts: 50,
            viewport: Viewport::new(800.0, 600.0),
            asset_latency_frames: 3,
            fast_scroll_toggles: 20,
            settle_frame_budget: 1000,
        }
    }
}

/// Result of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Wall-clock start of the run.
    pub timestamp_start: DateTime<Utc>,
    /// Wall-clock end of the run.
    pub timestamp_end: DateTime<Utc>,
    /// Seed of the insertion generator.
    pub seed: u64,
    /// Insertions performed.
    pub inserts: usize,
    /// Frames driven.
    pub frames: u64,
    /// Every reconciliation finished and every asset settled.
    pub settled: bool,
    /// Whether the viewport ended pinned to the bottom.
    pub pinned_to_bottom: bool,
    /// Final scroll state.
    pub scroll: ScrollMetrics,
    /// Unique ids and a non-empty label on every header.
    pub accessibility_smoke: CheckResult,
    /// Structural checks of the final layout.
    #[serde(flatten)]
    pub validation: ValidationReport,
}

impl CheckReport {
    /// Every check passed and everything settled.
    pub fn passed(&self) -> bool {
        self.settled && self.accessibility_smoke.passed() && self.validation.passed()
    }
}

/// Run the check against a fresh list.
pub fn run_check(config: ListConfig, options: &CheckOptions) -> CheckReport {
    let timestamp_start = Utc::now();
    let seed = config.seed;
    let mut list = ChatList::new(options.viewport, config);
    let mut source = SimulatedAssets::new(options.asset_latency_frames);

    for _ in 0..options.inserts {
        list.insert_once();
        list.drive(&mut source);
    }

    if options.fast_scroll_toggles > 0 && list.start_fast_scroll(options.fast_scroll_toggles) {
        for _ in 0..INSERTS_DURING_FAST_SCROLL {
            list.insert_once();
            list.drive(&mut source);
        }
    }

    let mut budget = options.settle_frame_budget;
    while !(list.is_idle() && !list.is_animating()) && budget > 0 {
        list.drive(&mut source);
        budget -= 1;
    }
    let settled = list.is_idle() && !list.is_animating();
    if !settled {
        warn!(
            phase = %list.phase(),
            queued = list.queued(),
            "List did not settle within the frame budget"
        );
    }

    let validation = list.validate();
    let accessibility_smoke = accessibility_smoke(&list, &validation);
    let report = CheckReport {
        timestamp_start,
        timestamp_end: Utc::now(),
        seed,
        inserts: options.inserts,
        frames: list.frames(),
        settled,
        pinned_to_bottom: list.is_pinned_to_bottom(),
        scroll: list.metrics(),
        accessibility_smoke,
        validation,
    };
    info!(
        passed = report.passed(),
        entries = report.validation.entry_count,
        frames = report.frames,
        "Headless check finished"
    );
    report
}

fn accessibility_smoke<T: LayoutTree>(list: &ChatList<T>, validation: &ValidationReport) -> CheckResult {
    let tree = list.tree();
    let unlabelled = (0..tree.len())
        .filter_map(|i| tree.entry_at(i))
        .filter(|entry| {
            entry.is_header()
                && !matches!(entry.content(), Content::Label { text } if !text.trim().is_empty())
        })
        .count();
    let duplicates = validation.duplicate_ids.len();
    CheckResult::from_bool(
        unlabelled == 0 && duplicates == 0,
        format!("{duplicates} duplicate ids, {unlabelled} unlabelled headers"),
    )
}
