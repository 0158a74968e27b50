//! # Engine Benchmarks
//!
//! Performance benchmarks for radar-core evaluation.
//!
//! Run with: `cargo bench -p radar-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use radar_core::curve::logarithmic;
use radar_core::{
    ActivityObservation, Engine, EngineConfig, OrgContext, RawMetricSet, TechnologyInput,
    snapshot_to_bytes,
};
use std::collections::BTreeMap;
use std::hint::black_box;

/// A radar of `size` technologies with varied metrics and 12 months of history.
fn create_radar(size: usize) -> BTreeMap<String, TechnologyInput> {
    (0..size)
        .map(|i| {
            let n = i as i64;
            let metrics = RawMetricSet {
                popularity: Some(n * 137 % 60_000),
                monthly_commits: Some(n * 7 % 500),
                monthly_releases: Some(n % 5),
                contributors: Some(n * 3 % 300),
                first_release_year: Some(2000 + (i % 26) as i32),
                enterprise_mentions: Some(n % 25),
                security_advisories: Some(n % 6),
                breaking_changes: Some(n % 2),
                pricing_volatility: Some(i % 7 == 0),
                vendor_lock_in: Some(i % 11 == 0),
                history: (0..12)
                    .map(|m| ActivityObservation::new(50 + (n + m) % 40, 1 + m % 3, (n + m) % 9 / 8))
                    .collect(),
            };
            let quadrant = ["languages", "tools", "platforms", "techniques"][i % 4];
            (format!("tech-{:05}", i), TechnologyInput::new(quadrant, metrics))
        })
        .collect()
}

fn engine(workers: usize) -> Engine {
    Engine::new(EngineConfig {
        max_concurrency: workers,
        ..EngineConfig::default()
    })
    .expect("engine")
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let engine = engine(3);

    for size in [10, 100, 1000].iter() {
        let radar = create_radar(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(engine.evaluate(&radar, OrgContext::default())));
        });
    }

    group.finish();
}

fn bench_concurrency(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrency");
    let radar = create_radar(1000);

    for workers in [1, 3, 8].iter() {
        let engine = engine(*workers);
        group.bench_with_input(BenchmarkId::from_parameter(workers), workers, |b, _| {
            b.iter(|| black_box(engine.evaluate(&radar, OrgContext::default())));
        });
    }

    group.finish();
}

fn bench_single_technology(c: &mut Criterion) {
    let engine = engine(1);
    let radar = create_radar(1);
    let Some(input) = radar.values().next() else {
        return;
    };

    c.bench_function("evaluate_technology", |b| {
        b.iter(|| black_box(engine.evaluate_technology(&input.metrics, OrgContext::default())));
    });
}

fn bench_encode_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_snapshot");
    let engine = engine(3);

    for size in [100, 1000].iter() {
        let snapshot = engine
            .evaluate(&create_radar(*size), OrgContext::default())
            .expect("evaluate");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(snapshot_to_bytes(&snapshot)));
        });
    }

    group.finish();
}

fn bench_log_curve(c: &mut Criterion) {
    c.bench_function("logarithmic_curve", |b| {
        b.iter(|| {
            for x in (0..50_000u64).step_by(97) {
                black_box(logarithmic(black_box(x), 50_000));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_concurrency,
    bench_single_technology,
    bench_encode_snapshot,
    bench_log_curve,
);

criterion_main!(benches);
