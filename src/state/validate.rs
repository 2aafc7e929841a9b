//! Structural checks over a list: unique ids, no overlapping messages,
//! undistorted media, one header per time bucket.

use super::settlement::aspect_diff_percent;
use crate::model::{EntryId, EntryKind, Side, SizeState, TimeBucket};
use crate::view_state::{BoundingBox, LayoutTree};
use serde::Serialize;
use std::collections::BTreeMap;

/// Default allowed ratio deviation for settled media, in percent.
pub const DEFAULT_ASPECT_TOLERANCE_PERCENT: f64 = 2.0;

/// Read-only view of one entry for validators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    /// Entry id.
    pub id: EntryId,
    /// Header or message.
    pub kind: EntryKind,
    /// Side of a message.
    pub side: Option<Side>,
    /// Box as of the last flush.
    pub bounding_box: BoundingBox,
    /// Media size state, for media entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_state: Option<SizeState>,
}

/// An id present more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    /// The repeated id.
    pub id: EntryId,
    /// How many entries carry it.
    pub count: usize,
}

/// Two entries whose boxes intersect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    /// Earlier entry.
    pub id_a: EntryId,
    /// Later entry.
    pub id_b: EntryId,
    /// Intersection area.
    pub overlap_area: f64,
}

/// Ratio check of one settled image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AspectRatioReport {
    /// Media entry.
    pub id: EntryId,
    /// Intrinsic width over height.
    pub natural_ratio: f64,
    /// Displayed width over height.
    pub display_ratio: f64,
    /// Relative deviation in percent.
    pub diff_percent: f64,
}

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// The check held.
    Pass,
    /// The check failed.
    Fail,
}

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Pass or fail.
    pub status: CheckStatus,
    /// What was checked.
    pub message: String,
}

impl CheckResult {
    /// Result from a boolean.
    pub fn from_bool(ok: bool, message: String) -> Self {
        Self {
            status: if ok { CheckStatus::Pass } else { CheckStatus::Fail },
            message,
        }
    }

    /// Whether the check held.
    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Pass
    }
}

/// All checks for one list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Entries checked.
    pub entry_count: usize,
    /// No two boxes intersect.
    pub layout_non_overlap: CheckResult,
    /// Every image keeps its ratio.
    pub media_aspect_ratio_ok: CheckResult,
    /// One header per time bucket.
    pub time_header_stability: CheckResult,
    /// No id repeats.
    pub unique_ids: CheckResult,
    /// Repeated ids.
    pub duplicate_ids: Vec<DuplicateId>,
    /// Intersecting pairs.
    pub overlaps: Vec<Overlap>,
    /// Per-image ratio reports.
    pub aspect_ratios: Vec<AspectRatioReport>,
}

impl ValidationReport {
    /// Whether every check passed.
    pub fn passed(&self) -> bool {
        self.layout_non_overlap.passed()
            && self.media_aspect_ratio_ok.passed()
            && self.time_header_stability.passed()
            && self.unique_ids.passed()
    }
}

/// Snapshot every entry in sequence order.
pub fn snapshot<T: LayoutTree + ?Sized>(tree: &T) -> Vec<EntrySnapshot> {
    (0..tree.len())
        .filter_map(|i| tree.entry_at(i))
        .map(|entry| EntrySnapshot {
            id: entry.id().clone(),
            kind: entry.kind(),
            side: entry.side(),
            bounding_box: tree.measure(entry.id()).unwrap_or_default(),
            size_state: entry.size_state(),
        })
        .collect()
}

/// Ids occurring more than once.
pub fn check_duplicate_ids(entries: &[EntrySnapshot]) -> Vec<DuplicateId> {
    let mut counts: BTreeMap<&EntryId, usize> = BTreeMap::new();
    for entry in entries {
        *counts.entry(&entry.id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| DuplicateId {
            id: id.clone(),
            count,
        })
        .collect()
}

/// Pairs of message boxes that share area.
pub fn check_overlaps(entries: &[EntrySnapshot]) -> Vec<Overlap> {
    let mut messages: Vec<&EntrySnapshot> = entries
        .iter()
        .filter(|e| e.kind == EntryKind::Message)
        .collect();
    messages.sort_by(|a, b| a.bounding_box.top.total_cmp(&b.bounding_box.top));

    let mut overlaps = Vec::new();
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            // sorted by top: nothing further down can reach back into `a`
            if b.bounding_box.top >= a.bounding_box.bottom() {
                break;
            }
            let area = a.bounding_box.intersection_area(&b.bounding_box);
            if area > 0.0 {
                overlaps.push(Overlap {
                    id_a: a.id.clone(),
                    id_b: b.id.clone(),
                    overlap_area: area,
                });
            }
        }
    }
    overlaps
}

/// Ratio deviation of every settled media entry.
pub fn check_aspect_ratios<T: LayoutTree + ?Sized>(tree: &T) -> Vec<AspectRatioReport> {
    (0..tree.len())
        .filter_map(|i| tree.entry_at(i))
        .filter_map(|entry| {
            let settlement = entry.media()?.settlement();
            let intrinsic = settlement.intrinsic()?;
            let display = settlement.display();
            Some(AspectRatioReport {
                id: entry.id().clone(),
                natural_ratio: intrinsic.ratio()?,
                display_ratio: display.ratio()?,
                diff_percent: aspect_diff_percent(intrinsic, display)?,
            })
        })
        .collect()
}

/// Run every check.
pub fn validate<T: LayoutTree + ?Sized>(tree: &T, aspect_tolerance_percent: f64) -> ValidationReport {
    let entries = snapshot(tree);
    let duplicate_ids = check_duplicate_ids(&entries);
    let overlaps = check_overlaps(&entries);
    let aspect_ratios = check_aspect_ratios(tree);

    let messages = entries.iter().filter(|e| e.kind == EntryKind::Message).count();
    let layout_non_overlap = CheckResult::from_bool(
        overlaps.is_empty(),
        format!("{} overlapping pairs among {} messages", overlaps.len(), messages),
    );

    let distorted = aspect_ratios
        .iter()
        .filter(|r| r.diff_percent > aspect_tolerance_percent)
        .count();
    let media_aspect_ratio_ok = CheckResult::from_bool(
        distorted == 0,
        format!(
            "{} of {} settled media exceed {}% ratio deviation",
            distorted,
            aspect_ratios.len(),
            aspect_tolerance_percent
        ),
    );

    let mut buckets: BTreeMap<TimeBucket, usize> = BTreeMap::new();
    let mut headers = 0usize;
    for index in 0..tree.len() {
        let Some(entry) = tree.entry_at(index) else {
            continue;
        };
        if entry.is_header() {
            headers += 1;
            if let Some(bucket) = entry.bucket() {
                *buckets.entry(bucket).or_default() += 1;
            }
        }
    }
    let repeated = buckets.values().filter(|c| **c > 1).count();
    let time_header_stability = CheckResult::from_bool(
        repeated == 0,
        format!("{} headers, {} repeated time buckets", headers, repeated),
    );

    let unique_ids = CheckResult::from_bool(
        duplicate_ids.is_empty(),
        format!("{} duplicate ids among {} entries", duplicate_ids.len(), entries.len()),
    );

    ValidationReport {
        entry_count: entries.len(),
        layout_non_overlap,
        media_aspect_ratio_ok,
        time_header_stability,
        unique_ids,
        duplicate_ids,
        overlaps,
        aspect_ratios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetRef, BoxSize, Entry, MediaDescriptor, SettleOutcome};
    use crate::view_state::{FixedHeight, StackLayout, Viewport};

    fn id(raw: &str) -> EntryId {
        EntryId::new(raw).unwrap()
    }

    fn snap(raw: &str, kind: EntryKind, top: f64, height: f64) -> EntrySnapshot {
        EntrySnapshot {
            id: id(raw),
            kind,
            side: None,
            bounding_box: BoundingBox::new(0.0, top, 100.0, height),
            size_state: None,
        }
    }

    #[test]
    fn duplicates_are_counted() {
        let entries = vec![
            snap("a", EntryKind::Message, 0.0, 10.0),
            snap("a", EntryKind::Message, 10.0, 10.0),
            snap("b", EntryKind::Message, 20.0, 10.0),
        ];
        assert_eq!(
            check_duplicate_ids(&entries),
            vec![DuplicateId {
                id: id("a"),
                count: 2
            }]
        );
    }

    #[test]
    fn stacked_messages_do_not_overlap() {
        let entries = vec![
            snap("a", EntryKind::Message, 0.0, 10.0),
            snap("b", EntryKind::Message, 10.0, 10.0),
        ];
        assert!(check_overlaps(&entries).is_empty());
    }

    #[test]
    fn overlapping_messages_are_reported() {
        let entries = vec![
            snap("a", EntryKind::Message, 0.0, 10.0),
            snap("b", EntryKind::Message, 5.0, 10.0),
        ];
        let overlaps = check_overlaps(&entries);
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].overlap_area, 500.0);
    }

    #[test]
    fn headers_are_ignored_by_overlap_check() {
        let entries = vec![
            snap("h", EntryKind::Header, 0.0, 10.0),
            snap("b", EntryKind::Message, 5.0, 10.0),
        ];
        assert!(check_overlaps(&entries).is_empty());
    }

    #[test]
    fn settled_media_is_reported_with_ratio() {
        let mut tree =
            StackLayout::with_measure(Viewport::new(400.0, 400.0), FixedHeight::new(20.0, 50.0));
        let mut entry = Entry::media_message(
            id("m"),
            Side::Left,
            MediaDescriptor::new(AssetRef::new("a")),
            BoxSize::new(100.0, 75.0),
        );
        entry.media_mut().unwrap().settlement_mut().resolve(
            BoxSize::new(300.0, 150.0),
            BoxSize::new(200.0, 100.0),
            SettleOutcome::Loaded,
        );
        tree.append_child(entry);
        tree.append_child(Entry::media_message(
            id("pending"),
            Side::Left,
            MediaDescriptor::new(AssetRef::new("b")),
            BoxSize::new(100.0, 75.0),
        ));
        tree.flush_layout();

        let reports = check_aspect_ratios(&tree);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].natural_ratio, 2.0);
        assert_eq!(reports[0].diff_percent, 0.0);
    }

    #[test]
    fn empty_report_passes() {
        let tree =
            StackLayout::with_measure(Viewport::new(400.0, 400.0), FixedHeight::new(20.0, 50.0));
        let report = validate(&tree, DEFAULT_ASPECT_TOLERANCE_PERCENT);
        assert!(report.passed());
        assert_eq!(report.entry_count, 0);
        insta::assert_snapshot!(serde_json::to_string(&report.duplicate_ids).unwrap(), @"[]");
    }

    #[test]
    fn repeated_bucket_fails_header_stability() {
        let mut tree =
            StackLayout::with_measure(Viewport::new(400.0, 400.0), FixedHeight::new(20.0, 50.0));
        let bucket = TimeBucket::from_hm(9, 15).unwrap();
        tree.append_child(Entry::header(id("h1"), bucket));
        tree.append_child(Entry::header(id("h2"), bucket));
        tree.flush_layout();

        let report = validate(&tree, DEFAULT_ASPECT_TOLERANCE_PERCENT);

        assert!(!report.time_header_stability.passed());
        assert!(!report.passed());
    }
}
