//! # Block Pool Benchmark
//!
//! Allocate/release cost for small, bounded pools. The first-fit scan is
//! O(slot_count), so cost is measured at several pool sizes.
//!
//! Run with: `cargo bench --package keystone_core --bench pool_benchmark`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keystone_core::BlockPool;

/// Benchmark: allocate then release one block on an otherwise empty pool.
fn bench_allocate_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_release");

    for slots in [16, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, &slots| {
            let mut pool = BlockPool::create(64, slots).expect("pool");
            b.iter(|| {
                let handle = pool.allocate().expect("free slot");
                black_box(handle.index());
                pool.release(handle).expect("release");
            });
        });
    }

    group.finish();
}

/// Benchmark: worst-case scan, only the last slot is free.
fn bench_allocate_last_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_last_slot");

    for slots in [16, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(slots), &slots, |b, &slots| {
            let mut pool = BlockPool::create(64, slots).expect("pool");
            let mut held: Vec<_> = (0..slots).map(|_| pool.allocate().expect("fill")).collect();
            let last = held.pop().expect("at least one slot");
            pool.release(last).expect("release last");

            b.iter(|| {
                let handle = pool.allocate().expect("last slot");
                black_box(handle.index());
                pool.release(handle).expect("release");
            });

            for handle in held {
                pool.release(handle).expect("drain");
            }
        });
    }

    group.finish();
}

/// Benchmark: fill an entire pool, then clear it.
fn bench_fill_and_clear(c: &mut Criterion) {
    c.bench_function("fill_and_clear_1024", |b| {
        let mut pool = BlockPool::create(32, 1024).expect("pool");
        b.iter(|| {
            while let Ok(handle) = pool.allocate() {
                black_box(handle.index());
            }
            pool.clear();
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_release,
    bench_allocate_last_slot,
    bench_fill_and_clear,
);
criterion_main!(benches);
