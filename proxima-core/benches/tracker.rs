//! Tracker hot-path benchmarks.
//!
//! Measures:
//! - Beacon processing for known and new peers
//! - Maintenance sweeps over a full table
//! - Lookups through long tombstone chains
//! - Beacon encode/decode

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proxima_core::{beacon::Beacon, tracker::ProximityTracker};

fn bench_on_beacon_received(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_beacon_received");
    group.throughput(Throughput::Elements(1));

    group.bench_function("known_peer", |b| {
        let mut tracker: ProximityTracker<20> = ProximityTracker::new(-63);
        for peer in 0..20 {
            tracker.on_beacon_received(peer, -50, 0);
        }
        let mut now = 0u32;
        b.iter(|| {
            now = now.wrapping_add(1);
            tracker.on_beacon_received(black_box(13), black_box(-50), now)
        });
    });

    group.bench_function("below_threshold", |b| {
        let mut tracker: ProximityTracker<20> = ProximityTracker::new(-63);
        b.iter(|| tracker.on_beacon_received(black_box(7), black_box(-80), 0));
    });

    group.bench_function("full_table_drop", |b| {
        let mut tracker: ProximityTracker<20> = ProximityTracker::new(-63);
        for peer in 0..20 {
            tracker.on_beacon_received(peer, -50, 0);
        }
        b.iter(|| tracker.on_beacon_received(black_box(1_000), black_box(-50), 1));
    });

    group.finish();
}

fn bench_maintenance(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_maintenance");

    for &stale in &[0usize, 10, 20] {
        group.bench_with_input(BenchmarkId::new("stale_peers", stale), &stale, |b, &stale| {
            b.iter_batched(
                || {
                    let mut tracker: ProximityTracker<20> = ProximityTracker::new(-63);
                    for peer in 0..20u32 {
                        let seen = if (peer as usize) < stale { 0 } else { 100 };
                        tracker.on_beacon_received(peer, -50, seen);
                    }
                    tracker
                },
                |mut tracker| tracker.run_maintenance(black_box(110)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_tombstone_chain(c: &mut Criterion) {
    // 19 colliding peers, all but the last deleted
    let mut tracker: ProximityTracker<20> = ProximityTracker::new(-63);
    for i in 0..19u32 {
        tracker.on_beacon_received(i * 20, -50, 0);
    }
    for i in 0..18u32 {
        tracker.forget(i * 20);
    }

    c.bench_function("lookup_past_tombstones", |b| {
        b.iter(|| tracker.get(black_box(18 * 20)).is_some());
    });
}

fn bench_codec(c: &mut Criterion) {
    let beacon = Beacon::new(7, 1_234, 56_789);
    let frame = beacon.encode();

    c.bench_function("beacon_encode", |b| b.iter(|| black_box(beacon).encode()));
    c.bench_function("beacon_decode", |b| b.iter(|| Beacon::decode(black_box(&frame))));
}

criterion_group!(
    benches,
    bench_on_beacon_received,
    bench_maintenance,
    bench_tombstone_chain,
    bench_codec
);
criterion_main!(benches);
