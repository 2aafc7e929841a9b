//! Insertion policy: placement, pinning, header dedup and eviction.

use crate::model::{EntryId, EntryKind, EntrySpec, Location, TimeBucket};
use crate::view_state::{LayoutTree, ProbeSnapshot};
use std::collections::{HashMap, HashSet};

/// Optional caps on retained entries. `None` disables the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvictionCaps {
    /// Most time headers kept.
    pub max_headers: Option<usize>,
    /// Most messages kept.
    pub max_messages: Option<usize>,
}

impl EvictionCaps {
    /// Whether any cap is set.
    pub fn is_enabled(&self) -> bool {
        self.max_headers.is_some() || self.max_messages.is_some()
    }
}

/// Where a batch goes and how the viewport follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// End the batch goes to.
    pub location: Location,
    /// Whether the correction follows the bottom.
    pub pin: bool,
}

/// Outcome of header deduplication for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLookup {
    /// A header for this bucket already exists (or is queued).
    Existing(EntryId),
    /// No header yet; the request proceeds.
    Fresh,
}

/// Stateful insertion policy for one list.
///
/// The header registry is keyed by time bucket. A header is registered when
/// it is requested, not when it lands, so two back-to-back requests for the
/// same bucket resolve to one entry even if the first is still queued.
#[derive(Debug, Clone, Default)]
pub struct InsertionPolicy {
    caps: EvictionCaps,
    headers: HashMap<TimeBucket, EntryId>,
}

impl InsertionPolicy {
    /// Policy with the given caps.
    pub fn new(caps: EvictionCaps) -> Self {
        Self {
            caps,
            headers: HashMap::new(),
        }
    }

    /// Configured caps.
    pub fn caps(&self) -> EvictionCaps {
        self.caps
    }

    /// Location a request resolves to. Untagged requests are incoming content.
    pub fn location(spec: &EntrySpec) -> Location {
        spec.location.unwrap_or(Location::Bottom)
    }

    /// Historical content never pins; incoming content pins iff the viewport
    /// was pinned when the pre-state was captured.
    pub fn decide(&self, location: Location, snapshot: &ProbeSnapshot) -> Placement {
        let pin = match location {
            Location::Top => false,
            Location::Bottom => snapshot.pinned,
        };
        Placement { location, pin }
    }

    /// Dedup a header request by bucket.
    pub fn lookup_header(&self, spec: &EntrySpec) -> HeaderLookup {
        match (spec.kind, spec.bucket) {
            (EntryKind::Header, Some(bucket)) => match self.headers.get(&bucket) {
                Some(id) => HeaderLookup::Existing(id.clone()),
                None => HeaderLookup::Fresh,
            },
            _ => HeaderLookup::Fresh,
        }
    }

    /// Record the header of a bucket.
    pub fn register_header(&mut self, bucket: TimeBucket, id: EntryId) {
        self.headers.insert(bucket, id);
    }

    /// Drop registry entries pointing at removed headers, so the bucket can
    /// be inserted again later.
    pub fn forget(&mut self, removed: &[EntryId]) {
        if removed.is_empty() {
            return;
        }
        let removed: HashSet<&EntryId> = removed.iter().collect();
        self.headers.retain(|_, id| !removed.contains(id));
    }

    /// Buckets with a header.
    pub fn registered_headers(&self) -> usize {
        self.headers.len()
    }

    /// Entries to remove so the caps hold once `incoming` lands at `location`.
    ///
    /// Victims come only from the end opposite the insertion point, scanning
    /// inward. The anchor is never chosen.
    pub fn plan_eviction<T: LayoutTree + ?Sized>(
        &self,
        tree: &T,
        location: Location,
        incoming: &[EntryKind],
        anchor: Option<&EntryId>,
    ) -> Vec<EntryId> {
        if !self.caps.is_enabled() {
            return Vec::new();
        }

        let count = |kind: EntryKind| {
            let existing = (0..tree.len())
                .filter_map(|i| tree.entry_at(i))
                .filter(|e| e.kind() == kind)
                .count();
            existing + incoming.iter().filter(|k| **k == kind).count()
        };

        let mut excess_headers = self
            .caps
            .max_headers
            .map_or(0, |cap| count(EntryKind::Header).saturating_sub(cap));
        let mut excess_messages = self
            .caps
            .max_messages
            .map_or(0, |cap| count(EntryKind::Message).saturating_sub(cap));

        let order: Box<dyn Iterator<Item = usize>> = match location {
            Location::Bottom => Box::new(0..tree.len()),
            Location::Top => Box::new((0..tree.len()).rev()),
        };

        let mut victims = Vec::new();
        for index in order {
            if excess_headers == 0 && excess_messages == 0 {
                break;
            }
            let Some(entry) = tree.entry_at(index) else {
                continue;
            };
            if Some(entry.id()) == anchor {
                continue;
            }
            let excess = match entry.kind() {
                EntryKind::Header => &mut excess_headers,
                EntryKind::Message => &mut excess_messages,
            };
            if *excess > 0 {
                *excess -= 1;
                victims.push(entry.id().clone());
            }
        }
        victims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Side};
    use crate::view_state::{FixedHeight, ScrollMetrics, StackLayout, Viewport};

    fn id(raw: &str) -> EntryId {
        EntryId::new(raw).unwrap()
    }

    fn bucket(m: u32) -> TimeBucket {
        TimeBucket::from_hm(9, m).unwrap()
    }

    fn snapshot(pinned: bool) -> ProbeSnapshot {
        ProbeSnapshot {
            metrics: ScrollMetrics::default(),
            pinned,
        }
    }

    /// h1 m1 m2 h2 m3
    fn tree() -> StackLayout<FixedHeight> {
        let mut tree =
            StackLayout::with_measure(Viewport::new(400.0, 100.0), FixedHeight::new(20.0, 50.0));
        tree.append_child(Entry::header(id("h1"), bucket(1)));
        tree.append_child(Entry::text(id("m1"), Side::Left, "x"));
        tree.append_child(Entry::text(id("m2"), Side::Right, "x"));
        tree.append_child(Entry::header(id("h2"), bucket(2)));
        tree.append_child(Entry::text(id("m3"), Side::Left, "x"));
        tree
    }

    #[test]
    fn top_never_pins() {
        let policy = InsertionPolicy::default();
        assert_eq!(
            policy.decide(Location::Top, &snapshot(true)),
            Placement {
                location: Location::Top,
                pin: false
            }
        );
    }

    #[test]
    fn bottom_pins_when_snapshot_was_pinned() {
        let policy = InsertionPolicy::default();
        assert!(policy.decide(Location::Bottom, &snapshot(true)).pin);
        assert!(!policy.decide(Location::Bottom, &snapshot(false)).pin);
    }

    #[test]
    fn untagged_request_is_incoming() {
        assert_eq!(
            InsertionPolicy::location(&EntrySpec::text(Side::Left, "x")),
            Location::Bottom
        );
        assert_eq!(
            InsertionPolicy::location(&EntrySpec::header(bucket(0)).at(Location::Top)),
            Location::Top
        );
    }

    #[test]
    fn registered_bucket_is_existing() {
        let mut policy = InsertionPolicy::default();
        policy.register_header(bucket(5), id("time-101"));

        assert_eq!(
            policy.lookup_header(&EntrySpec::header(bucket(5))),
            HeaderLookup::Existing(id("time-101"))
        );
        assert_eq!(policy.lookup_header(&EntrySpec::header(bucket(6))), HeaderLookup::Fresh);
    }

    #[test]
    fn messages_are_never_deduplicated() {
        let policy = InsertionPolicy::default();
        assert_eq!(
            policy.lookup_header(&EntrySpec::text(Side::Left, "x")),
            HeaderLookup::Fresh
        );
    }

    #[test]
    fn forget_frees_the_bucket() {
        let mut policy = InsertionPolicy::default();
        policy.register_header(bucket(5), id("time-101"));
        policy.forget(&[id("time-101")]);
        assert_eq!(policy.lookup_header(&EntrySpec::header(bucket(5))), HeaderLookup::Fresh);
        assert_eq!(policy.registered_headers(), 0);
    }

    #[test]
    fn eviction_disabled_by_default() {
        let policy = InsertionPolicy::default();
        assert!(policy
            .plan_eviction(&tree(), Location::Bottom, &[EntryKind::Message], None)
            .is_empty());
    }

    #[test]
    fn bottom_insert_evicts_from_top() {
        let policy = InsertionPolicy::new(EvictionCaps {
            max_headers: None,
            max_messages: Some(3),
        });
        let victims = policy.plan_eviction(&tree(), Location::Bottom, &[EntryKind::Message], None);
        assert_eq!(victims, vec![id("m1")]);
    }

    #[test]
    fn top_insert_evicts_from_bottom() {
        let policy = InsertionPolicy::new(EvictionCaps {
            max_headers: Some(2),
            max_messages: None,
        });
        let victims = policy.plan_eviction(&tree(), Location::Top, &[EntryKind::Header], None);
        assert_eq!(victims, vec![id("h2")]);
    }

    #[test]
    fn anchor_is_skipped() {
        let policy = InsertionPolicy::new(EvictionCaps {
            max_headers: None,
            max_messages: Some(2),
        });
        let anchor = id("m1");
        let victims =
            policy.plan_eviction(&tree(), Location::Bottom, &[EntryKind::Message], Some(&anchor));
        assert_eq!(victims, vec![id("m2"), id("m3")]);
    }
}
