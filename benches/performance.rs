//! Performance benchmarks for the log reduction path
//!
//! A full run reduces 100 logs per level, so extraction and aggregation
//! should stay well below the time spent on the device.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use guest_clock_bench::{
    cli::Cli,
    config::ConfigParser,
    models::SampleStats,
    stats::{self, RunLayout},
    types::ParseMethod,
};
use clap::Parser;
use std::fs;

/// Strictly increasing nanosecond timestamps with a little jitter
fn create_timestamps(count: usize) -> Vec<i64> {
    let mut now = 1_000_000_000i64;
    (0..count)
        .map(|i| {
            now += 1_000 + (i as i64 * 7919) % 250;
            now
        })
        .collect()
}

/// Coarse timestamps where each tick repeats several times
fn create_coarse_timestamps(count: usize) -> Vec<i64> {
    (0..count).map(|i| (i / 5 + (i % 3) / 2) as i64).collect()
}

fn benchmark_latency_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("latency_extraction");

    for size in [100usize, 1_000, 10_000].iter() {
        let fine = create_timestamps(*size);
        let coarse = create_coarse_timestamps(*size);

        group.bench_with_input(BenchmarkId::new("diffs", size), size, |b, _| {
            b.iter(|| black_box(stats::compute_latency(black_box(&fine), ParseMethod::Diffs)))
        });

        group.bench_with_input(BenchmarkId::new("runs", size), size, |b, _| {
            b.iter(|| black_box(stats::compute_latency(black_box(&coarse), ParseMethod::Runs)))
        });
    }

    group.finish();
}

fn benchmark_sample_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_stats");

    for size in [100usize, 10_000].iter() {
        let values = stats::compute_latency(&create_timestamps(*size + 1), ParseMethod::Diffs);
        group.bench_with_input(BenchmarkId::new("from_values", size), size, |b, _| {
            b.iter(|| black_box(SampleStats::from_values(black_box(&values))))
        });
    }

    group.finish();
}

fn benchmark_config_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_parsing");

    group.bench_function("parse_cli_args", |b| {
        b.iter(|| black_box(Cli::parse_from(["gcb", "KVM", "-l", "NONE,HIGH", "--no-color"])))
    });

    group.bench_function("apply_cli_overrides", |b| {
        let cli = Cli::parse_from(["gcb", "KVM", "-l", "NONE,HIGH", "--no-color"]);
        let parser = ConfigParser::new(cli);
        b.iter(|| {
            let mut config = guest_clock_bench::Config::default();
            black_box(parser.apply_cli_overrides(&mut config))
        })
    });

    group.finish();
}

fn benchmark_parse_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_run");
    group.sample_size(10);

    group.bench_function("hundred_logs", |b| {
        let timestamps = create_timestamps(1_000);
        let body: String = timestamps.iter().map(|t| format!("{}\n", t)).collect();

        b.iter_batched(
            || {
                let dir = tempfile::tempdir().unwrap();
                let layout = RunLayout::new(dir.path().join("logs/KVM/NONE"));
                fs::create_dir_all(layout.raw_times()).unwrap();
                for i in 0..100 {
                    fs::write(layout.raw_log(i), &body).unwrap();
                }
                (dir, layout)
            },
            |(_dir, layout)| black_box(stats::parse_run(ParseMethod::Diffs, &layout)),
            criterion::BatchSize::PerIteration,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_latency_extraction,
    benchmark_sample_stats,
    benchmark_config_parsing,
    benchmark_parse_run
);
criterion_main!(benches);
