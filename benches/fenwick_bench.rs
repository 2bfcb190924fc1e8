//! Benchmarks for the Fenwick offset index: point update, prefix-sum
//! query, and the binary-search descent `pointAtStringLocation` relies
//! on (spec §4.3).
//!
//! Grounded on `tiny_editor`'s `tree_bench.rs` navigation benchmarks
//! (`byte_to_line`/`line_to_byte` over a generated document of varying
//! size), generalized from a rope's O(log n) line index to the
//! node-indexed Fenwick tree.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use scribe_core::fenwick::FenwickTree;

/// A Fenwick tree with `n` slots, each holding a length similar to a
/// short text run (mix of short words and block-closing newlines).
fn populated_tree(n: usize) -> FenwickTree {
    let mut fw = FenwickTree::new(n);
    for i in 0..n {
        let len = match i % 5 {
            0 => 1,
            1 => 12,
            2 => 40,
            3 => 3,
            _ => 0,
        };
        fw.update(i, len);
    }
    fw
}

fn bench_point_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_point_update");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut fw = populated_tree(size);
                for i in 0..100 {
                    fw.update(i % size, 1);
                }
                std::hint::black_box(fw.total_sum());
            });
        });
    }
    group.finish();
}

fn bench_prefix_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_prefix_sum");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        let fw = populated_tree(*size);
        let positions: Vec<usize> = (0..100).map(|i| (*size * i) / 100).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for &pos in &positions {
                    std::hint::black_box(fw.prefix_sum(pos));
                }
            });
        });
    }
    group.finish();
}

fn bench_find_first_index_with_prefix(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_find_first_index");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        let fw = populated_tree(*size);
        let total = fw.total_sum();
        let targets: Vec<i64> = (0..100).map(|i| (total * i as i64) / 100).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for &target in &targets {
                    std::hint::black_box(fw.find_first_index_with_prefix(target));
                }
            });
        });
    }
    group.finish();
}

fn bench_dynamic_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("fenwick_dynamic_growth");
    group.bench_function("grow_from_empty_by_appending", |b| {
        b.iter(|| {
            let mut fw = FenwickTree::new(0);
            for i in 0..10_000 {
                fw.update(i, 1);
            }
            std::hint::black_box(fw.total_sum());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_point_update, bench_prefix_sum, bench_find_first_index_with_prefix, bench_dynamic_growth);
criterion_main!(benches);
