use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hostprobe::format::{format_bytes, format_rate};
use hostprobe::system::snapshot::CounterSnapshot;
use hostprobe::system::utilization::compute_delta;
use std::hint::black_box;

fn bench_format_bytes(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_bytes");
    for n in [512u64, 1536, 8_000_000_000, u64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| format_bytes(black_box(n)))
        });
    }
    group.finish();
}

fn bench_format_rate(c: &mut Criterion) {
    c.bench_function("format_rate", |b| b.iter(|| format_rate(black_box(0.12345))));
}

fn bench_compute_delta(c: &mut Criterion) {
    let prev = CounterSnapshot {
        nice: 40,
        iowait: 12,
        irq: 3,
        softirq: 9,
        steal: 1,
        ..CounterSnapshot::new(1000, 500, 8500)
    };
    let curr = CounterSnapshot {
        nice: 52,
        iowait: 30,
        irq: 4,
        softirq: 15,
        steal: 2,
        ..CounterSnapshot::new(1200, 600, 9200)
    };
    c.bench_function("compute_delta", |b| {
        b.iter(|| compute_delta(black_box(&prev), black_box(&curr)))
    });
}

criterion_group!(
    benches,
    bench_format_bytes,
    bench_format_rate,
    bench_compute_delta
);
criterion_main!(benches);
