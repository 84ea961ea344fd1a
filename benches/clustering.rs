use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use mymoment::model::{Moment, TimeRange};
use mymoment::service::clustering::{cluster, core_range};

fn moments(count: usize, groups: usize) -> Vec<Moment> {
    (0..count)
        .map(|i| {
            let start = ((i * 37) % 600) as f64;
            let end = start + ((i * 13) % 45) as f64;
            Moment::new(format!("m{i}"), "video", start, end)
                .map(|m| m.with_group(format!("g{}", i % groups)))
                .expect("generated offsets are valid")
        })
        .collect()
}

fn bench_cluster(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster");

    for count in [10, 100, 1_000, 10_000] {
        let input = moments(count, 8);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| cluster(black_box(input)))
        });
    }

    group.finish();
}

fn bench_core_range(c: &mut Criterion) {
    let ranges: Vec<TimeRange> = moments(10_000, 1).iter().map(Moment::range).collect();

    c.bench_function("core_range/10000", |b| {
        b.iter(|| core_range(black_box(&ranges)))
    });
}

criterion_group!(benches, bench_cluster, bench_core_range);
criterion_main!(benches);
