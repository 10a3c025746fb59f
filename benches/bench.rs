//! Criterion benchmarks for pisearch.
//!
//! Covers index construction, indexed queries (with and without
//! verification) and the streaming scan over the same digits.

use std::fs;
use std::hint::black_box;
use std::path::{Path, PathBuf};

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use pisearch::index::{BuildConfig, IndexBuilder, IndexReader};
use pisearch::matcher::stream_search;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

const DIGIT_COUNT: usize = 1_000_000;
const PSIZE: usize = 5;

/// Generate a digit file with a leading separator byte.
fn generate_digits(dir: &Path) -> (PathBuf, String) {
    let mut rng = StdRng::seed_from_u64(314);
    let digits: String = (0..DIGIT_COUNT)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();
    let path = dir.join("pi.txt");
    fs::write(&path, format!(".{digits}\n")).unwrap();
    (path, digits)
}

fn build_config() -> BuildConfig {
    BuildConfig {
        psize: PSIZE,
        progress_interval: 0,
        ..Default::default()
    }
}

fn bench_build(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let (digits_path, _) = generate_digits(dir.path());
    let index_path = dir.path().join("pi.index");
    let builder = IndexBuilder::new(build_config()).unwrap();

    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    group.throughput(Throughput::Elements(DIGIT_COUNT as u64));
    group.bench_function("psize_5", |b| {
        b.iter(|| black_box(builder.build(&index_path, &digits_path).unwrap()))
    });
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let (digits_path, digits) = generate_digits(dir.path());
    let index_path = dir.path().join("pi.index");
    IndexBuilder::new(build_config())
        .unwrap()
        .build(&index_path, &digits_path)
        .unwrap();
    let mut reader = IndexReader::open(&index_path, &digits_path).unwrap();

    let exact = digits[1000..1000 + PSIZE].to_string();
    let prefix = digits[2000..2003].to_string();
    let long = digits[3000..3010].to_string();

    let mut group = c.benchmark_group("query");
    for (name, pattern) in [("exact_key", &exact), ("prefix", &prefix), ("verified", &long)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let hits = reader
                    .begin_query(black_box(pattern))
                    .unwrap()
                    .with_context(16)
                    .count();
                black_box(hits)
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("scan");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(DIGIT_COUNT as u64));
    for (name, pattern) in [("prefix", &prefix), ("long", &long)] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(stream_search(&digits_path, pattern).unwrap().count()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
