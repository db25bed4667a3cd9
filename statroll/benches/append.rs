//! Microbenchmarks for the `sample()` write path.
//!
//! Measures per-tick append latency across payload sizes and the cost of a
//! rotation-heavy configuration.
//!
//! Run with: `cargo bench -p statroll -- sample`

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use statroll::{FixedSnapshot, SampleCollector, SessionConfig};
use tempfile::tempdir;

/// Creates an initialized collector with a fixed payload size.
fn setup_collector(
    payload_len: usize,
    file_size_limit: u64,
    disk_space_limit: u64,
) -> (SampleCollector<FixedSnapshot>, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();

    let collector = SampleCollector::new(FixedSnapshot::zeroes(payload_len));
    collector
        .initialize(
            SessionConfig {
                archive_path: temp_dir.path().join("bench.sra"),
                file_size_limit,
                disk_space_limit,
                system_id: 1,
                start_time_ms: 1_700_000_000_000,
            },
            0,
        )
        .unwrap();

    (collector, temp_dir)
}

fn bench_sample_payload_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample/payload_bytes");

    for payload_len in [64usize, 256, 1024, 4096] {
        // Large file limit: measure pure appends, no rotation.
        let (collector, _dir) = setup_collector(payload_len, u64::MAX, 0);
        let mut ts = 0u64;

        group.bench_with_input(
            BenchmarkId::from_parameter(payload_len),
            &payload_len,
            |b, _| {
                b.iter(|| {
                    ts += 1_000_000_000;
                    collector.sample(black_box(ts)).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_sample_with_rotation(c: &mut Criterion) {
    // Small file limit: a rotation roughly every 8 ticks, retention bounded.
    let (collector, _dir) = setup_collector(256, 2048, 64 * 1024);
    let mut ts = 0u64;

    c.bench_function("sample/rotation_heavy", |b| {
        b.iter(|| {
            ts += 1_000_000_000;
            collector.sample(black_box(ts)).unwrap();
        });
    });
}

criterion_group!(benches, bench_sample_payload_sizes, bench_sample_with_rotation);
criterion_main!(benches);
