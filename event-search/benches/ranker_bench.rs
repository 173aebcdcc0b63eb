use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use event_search::{rank, EmbeddingVector};

const DIMENSION: usize = 384;

/// Deterministic pseudo-embedding for candidate `seed`
fn vector(seed: usize) -> EmbeddingVector {
    EmbeddingVector::normalized(
        (0..DIMENSION)
            .map(|i| ((seed * 31 + i * 7) as f32 * 0.013).sin())
            .collect(),
    )
}

fn bench_rank(c: &mut Criterion) {
    let query = vector(7_777);
    let mut group = c.benchmark_group("rank_top_20");

    for size in [100usize, 1_000, 5_000] {
        let candidates: Vec<(usize, EmbeddingVector)> = (0..size).map(|i| (i, vector(i))).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| {
                rank(
                    black_box(query.as_slice()),
                    candidates.iter().map(|(id, v)| (*id, v)),
                    20,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
