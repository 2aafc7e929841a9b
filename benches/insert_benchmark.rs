//! Insertion and reconciliation benchmarks.
//!
//! Measures the cost of one reconciled insertion against lists of growing
//! size, for each end and for media settlement.
//!
//! Run with: cargo bench --bench insert_benchmark

#![allow(missing_docs)] // criterion macros generate undocumented items

use chatscroll::integration::{run_check, CheckOptions};
use chatscroll::model::{EntrySpec, Location, MediaSpec, Side, TimeBucket};
use chatscroll::state::{ChatList, ListConfig};
use chatscroll::view_state::Viewport;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

const SIZES: [usize; 3] = [100, 1_000, 5_000];

/// A list of `size` text messages with the reader at `offset`.
fn baseline(size: usize, offset: Option<f64>) -> ChatList {
    let mut list = ChatList::new(Viewport::new(800.0, 600.0), ListConfig::default());
    let specs = (0..size)
        .map(|n| EntrySpec::text(if n % 2 == 0 { Side::Left } else { Side::Right }, format!("message {n}")))
        .collect();
    list.insert_batch(specs, Location::Bottom);
    match offset {
        Some(offset) => {
            list.scroll_to_top();
            list.scroll_by(offset);
        }
        None => list.scroll_to_bottom(),
    }
    list
}

fn benchmark_append_pinned(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_pinned");
    for size in SIZES {
        let list = baseline(size, None);
        group.bench_with_input(BenchmarkId::from_parameter(size), &list, |b, list| {
            b.iter_batched(
                || list.clone(),
                |mut list| {
                    black_box(list.insert_entry(EntrySpec::text(Side::Right, "new message")));
                    list
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn benchmark_prepend_anchored(c: &mut Criterion) {
    let mut group = c.benchmark_group("prepend_anchored");
    let bucket = TimeBucket::from_hm(8, 0).expect("valid bucket");
    for size in SIZES {
        let list = baseline(size, Some(2_000.0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &list, |b, list| {
            b.iter_batched(
                || list.clone(),
                |mut list| {
                    black_box(list.insert_batch(
                        vec![
                            EntrySpec::header(bucket),
                            EntrySpec::text(Side::Left, "older message"),
                        ],
                        Location::Top,
                    ));
                    list
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn benchmark_media_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("media_settlement");
    for size in SIZES {
        let list = baseline(size, Some(1_000.0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &list, |b, list| {
            b.iter_batched(
                || {
                    let mut list = list.clone();
                    let id = list.insert_entry(
                        EntrySpec::media(Side::Left, MediaSpec::new("photo")).at(Location::Top),
                    );
                    (list, id)
                },
                |(mut list, id)| {
                    list.asset_ready(&id, 640.0, 480.0);
                    list
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn benchmark_headless_check(c: &mut Criterion) {
    let options = CheckOptions {
        inserts: 100,
        ..CheckOptions::default()
    };
    c.bench_function("headless_check_100", |b| {
        b.iter(|| black_box(run_check(ListConfig::default(), &options)))
    });
}

criterion_group!(
    benches,
    benchmark_append_pinned,
    benchmark_prepend_anchored,
    benchmark_media_settlement,
    benchmark_headless_check
);
criterion_main!(benches);
