//! Partitioning and seed-derivation micro-benchmarks.
//!
//! Run with: `cargo bench --bench partition`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use simfarm::partition::chunk_events;
use simfarm::sim::SeedPolicy;

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    group.bench_function("chunk_1m_events_65_workers", |b| {
        b.iter(|| black_box(chunk_events(black_box(1_000_000), black_box(65))))
    });

    group.bench_function("per_range_seed_derivation", |b| {
        let ranges = chunk_events(1_000_000, 65).expect("valid partition");
        let policy = SeedPolicy::PerRange(42);
        b.iter(|| {
            ranges
                .iter()
                .map(|&range| policy.seed_for(range))
                .fold(0u64, |acc, seed| acc ^ black_box(seed))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_partition);
criterion_main!(benches);
