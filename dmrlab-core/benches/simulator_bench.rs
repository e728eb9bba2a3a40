//! Criterion benchmarks for DMRLab hot paths.
//!
//! Benchmarks:
//! 1. Simulator daily loop (ungated and gated)
//! 2. Feature pipeline over all built-in features
//! 3. Random forest fit on a walk-forward-sized training window

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dmrlab_core::classifier::{Classifier, ForestParams, RandomForest};
use dmrlab_core::data::AlignedPair;
use dmrlab_core::domain::Bar;
use dmrlab_core::engine::Simulator;
use dmrlab_core::features::FeaturePipeline;
use dmrlab_core::walk_forward::RiskSeries;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize, phase: f64) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2015, 1, 5).unwrap();
    let mut prev = 100.0;
    (0..n)
        .map(|i| {
            let close = 100.0 + ((i as f64 * 0.05) + phase).sin() * 15.0 + i as f64 * 0.01;
            let pct_chg = (close / prev - 1.0) * 100.0;
            prev = close;
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                close,
                pct_chg,
                1.0e9 + (i % 97) as f64 * 1.0e6,
            )
        })
        .collect()
}

fn make_pair(n: usize) -> AlignedPair {
    AlignedPair::align(&make_bars(n, 0.0), &make_bars(n, 1.3)).expect("aligned bench data")
}

// ── 1. Simulator ─────────────────────────────────────────────────────

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    let sim = Simulator::default();

    for &n in &[1_260usize, 2_520] {
        let pair = make_pair(n);
        group.bench_with_input(BenchmarkId::new("ungated", n), &pair, |b, pair| {
            b.iter(|| sim.run(black_box(pair), 20, 14, None))
        });

        let risk: RiskSeries = pair
            .dates()
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, ((i as f64) * 0.1).sin().abs() * 0.6))
            .collect();
        group.bench_with_input(BenchmarkId::new("gated", n), &pair, |b, pair| {
            b.iter(|| sim.run(black_box(pair), 20, 14, Some(&risk)))
        });
    }
    group.finish();
}

// ── 2. Feature pipeline ──────────────────────────────────────────────

fn bench_features(c: &mut Criterion) {
    let bars = make_bars(2_520, 0.0);
    let pipeline = FeaturePipeline::standard();
    c.bench_function("feature_pipeline_standard_2520", |b| {
        b.iter(|| pipeline.run(black_box(&bars)))
    });
}

// ── 3. Forest fit ────────────────────────────────────────────────────

fn bench_forest(c: &mut Criterion) {
    let x: Vec<Vec<f64>> = (0..247)
        .map(|i| {
            let t = i as f64;
            vec![(t * 0.3).sin(), (t * 0.07).cos(), (t * 0.011).sin()]
        })
        .collect();
    let y: Vec<bool> = x.iter().map(|r| r[0] + 0.5 * r[1] > 0.6).collect();

    c.bench_function("forest_fit_100_trees_247_rows", |b| {
        b.iter(|| {
            let mut forest = RandomForest::new(ForestParams::default());
            forest.fit(black_box(&x), black_box(&y))
        })
    });
}

criterion_group!(benches, bench_simulator, bench_features, bench_forest);
criterion_main!(benches);
