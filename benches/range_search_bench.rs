//! Benchmarks for range-filtered graph search.
//!
//! Run with: cargo bench --bench range_search_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use range_forge::dataset::{random_attributes, Dataset};
use range_forge::{BruteForceIndex, DistanceMetric, RangeForgeBuilder, RangeForgeIndex};

const DIM: usize = 64;
const ATTR_MAX: i64 = 999;

fn build_index(n: usize) -> (RangeForgeIndex, Dataset, Vec<i64>) {
    let dataset = Dataset::generate(n, 100, DIM);
    let attributes = random_attributes(n, ATTR_MAX);
    let index = RangeForgeBuilder::new(16, 100)
        .build(&dataset.vectors, &attributes)
        .unwrap();
    (index, dataset, attributes)
}

/// Benchmark query latency across range selectivities.
fn benchmark_range_selectivity(c: &mut Criterion) {
    let (index, dataset, _) = build_index(20_000);
    let query = &dataset.queries[0];

    let mut group = c.benchmark_group("range_selectivity");
    group.throughput(Throughput::Elements(1));

    // Fraction of the attribute domain covered by the query range.
    for percent in [1i64, 10, 50, 100] {
        let hi = ATTR_MAX * percent / 100;
        group.bench_with_input(BenchmarkId::new("percent", percent), &hi, |b, &hi| {
            b.iter(|| index.search(black_box(&query.data), 0, black_box(hi), 10))
        });
    }

    group.finish();
}

/// Benchmark across dataset sizes at fixed selectivity.
fn benchmark_dataset_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset_sizes");
    group.throughput(Throughput::Elements(1));

    for size in [1_000, 10_000, 50_000] {
        let (index, dataset, _) = build_index(size);
        let query = &dataset.queries[0];

        group.bench_function(BenchmarkId::new("graph", size), |b| {
            b.iter(|| index.search(black_box(&query.data), 100, 600, 10))
        });
    }

    group.finish();
}

/// Benchmark the ef_search knob.
fn benchmark_ef_search(c: &mut Criterion) {
    let (mut index, dataset, _) = build_index(20_000);
    let query = dataset.queries[0].clone();

    let mut group = c.benchmark_group("ef_search");
    group.throughput(Throughput::Elements(1));

    for ef in [10usize, 50, 100, 200] {
        index.set_ef_search(ef);
        let snapshot = &index;
        group.bench_with_input(BenchmarkId::new("ef", ef), snapshot, |b, idx| {
            b.iter(|| idx.search(black_box(&query.data), 100, 600, 10))
        });
    }

    group.finish();
}

/// Compare graph search against the exact baseline at equal selectivity.
fn benchmark_vs_brute_force(c: &mut Criterion) {
    let n = 20_000;
    let (index, dataset, attributes) = build_index(n);
    let query = &dataset.queries[0];

    let mut exact = BruteForceIndex::new(DistanceMetric::Euclidean);
    for vector in &dataset.vectors {
        exact.add(vector.clone());
    }

    let (lo, hi) = (100i64, 600i64);
    let mut group = c.benchmark_group("graph_vs_brute_force");
    group.throughput(Throughput::Elements(1));

    group.bench_function("graph", |b| {
        b.iter(|| index.search(black_box(&query.data), lo, hi, 10))
    });

    group.bench_function("brute_force_filtered", |b| {
        b.iter(|| {
            exact.search_where(black_box(&query.data), 10, |id| {
                (lo..=hi).contains(&attributes[id as usize])
            })
        })
    });

    group.finish();
}

/// Benchmark index construction time.
fn benchmark_build(c: &mut Criterion) {
    let dataset = Dataset::generate(5_000, 1, DIM);
    let attributes = random_attributes(5_000, ATTR_MAX);

    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    group.bench_function("build_5k", |b| {
        b.iter(|| {
            RangeForgeBuilder::new(16, 100)
                .build(black_box(&dataset.vectors), black_box(&attributes))
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_range_selectivity,
    benchmark_dataset_sizes,
    benchmark_ef_search,
    benchmark_vs_brute_force,
    benchmark_build,
);

criterion_main!(benches);
