//! Criterion micro-benchmarks for push, clone, clear, and owned iteration.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use dynarr::DynArray;
use dynarr_bench::{fill_presized, fill_sequential, labels, SIZES};

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("grow_from_empty", n), &n, |b, &n| {
            b.iter(|| black_box(fill_sequential(n)));
        });
        group.bench_with_input(BenchmarkId::new("presized", n), &n, |b, &n| {
            b.iter(|| black_box(fill_presized(n)));
        });
        // Baseline against the standard library's growth policy.
        group.bench_with_input(BenchmarkId::new("std_vec", n), &n, |b, &n| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..n as u64 {
                    v.push(i);
                }
                black_box(v)
            });
        });
    }
    group.finish();
}

fn bench_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("clone");
    for n in SIZES {
        let ints = fill_sequential(n);
        group.bench_with_input(BenchmarkId::new("u64", n), &ints, |b, ints| {
            b.iter(|| black_box(ints.clone()));
        });
        let strings = labels(n);
        group.bench_with_input(BenchmarkId::new("string", n), &strings, |b, strings| {
            b.iter(|| black_box(strings.clone()));
        });
    }
    group.finish();
}

fn bench_clear_and_refill(c: &mut Criterion) {
    let n = 4_096;
    let mut array: DynArray<String> = labels(n);
    c.bench_function("clear_and_refill_4096", |b| {
        b.iter(|| {
            array.clear();
            for i in 0..n {
                array.emplace_with(|| i.to_string());
            }
            black_box(array.len())
        });
    });
}

fn bench_into_iter(c: &mut Criterion) {
    c.bench_function("into_iter_sum_65536", |b| {
        b.iter_batched(
            || fill_sequential(65_536),
            |array| black_box(array.into_iter().sum::<u64>()),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_clone,
    bench_clear_and_refill,
    bench_into_iter
);
criterion_main!(benches);
