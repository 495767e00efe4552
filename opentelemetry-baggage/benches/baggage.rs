use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use opentelemetry_baggage::baggage::{self, Baggage};
use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;

const DISTINCT_KEYS: usize = 64;

// Run this benchmark with:
// cargo bench --bench baggage

fn criterion_benchmark(c: &mut Criterion) {
    set_static_key_value(c);
    set_dynamic(c);
    set_dynamic_with_metadata(c);
    parse_header(c);
    format_header(c);
}

fn random_pairs(n: usize) -> Vec<(String, String)> {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| {
            (
                Alphanumeric.sample_string(&mut rng, 4),
                Alphanumeric.sample_string(&mut rng, 4),
            )
        })
        .collect()
}

fn set_static_key_value(c: &mut Criterion) {
    let baggage = Baggage::from_header("k1=v1,k2=v2,k3=v3");

    c.bench_function("set_baggage_static_key_value", move |b| {
        b.iter(|| baggage.set("key", "value"))
    });
}

fn set_dynamic(c: &mut Criterion) {
    let key_value = random_pairs(DISTINCT_KEYS);
    let baggage: Baggage = key_value.iter().take(16).cloned().collect::<Vec<_>>().into();
    let mut rng = rand::rng();

    c.bench_function("set_baggage_dynamic", move |b| {
        b.iter_batched(
            || rng.random_range(0..DISTINCT_KEYS),
            |idx| {
                let (key, value) = key_value[idx].clone();
                baggage.set(key, value)
            },
            BatchSize::SmallInput,
        )
    });
}

fn set_dynamic_with_metadata(c: &mut Criterion) {
    let mut rng = rand::rng();
    let key_value_metadata = (0..DISTINCT_KEYS)
        .map(|_| {
            (
                Alphanumeric.sample_string(&mut rng, 4),
                Alphanumeric.sample_string(&mut rng, 4),
                Alphanumeric.sample_string(&mut rng, 4),
            )
        })
        .collect::<Vec<(String, String, String)>>();
    let baggage = Baggage::new();

    c.bench_function("set_baggage_dynamic_with_metadata", move |b| {
        b.iter_batched(
            || rng.random_range(0..DISTINCT_KEYS),
            |idx| {
                let (key, value, metadata) = key_value_metadata[idx].clone();
                baggage.set_with_metadata(key, value, metadata)
            },
            BatchSize::SmallInput,
        )
    });
}

fn header_of(n: usize) -> String {
    random_pairs(n)
        .into_iter()
        .enumerate()
        .map(|(i, (k, v))| format!("{k}{i}={v}%20{v};ttl={i}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_baggage");
    for n in [1, 16, baggage::MAX_KEY_VALUE_PAIRS] {
        let header = header_of(n);
        group.bench_function(format!("{n}_members"), |b| {
            b.iter(|| Baggage::from_header(&header))
        });
    }
    group.finish();
}

fn format_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_baggage");
    for n in [1, 16, baggage::MAX_KEY_VALUE_PAIRS] {
        let baggage = Baggage::from_header(&header_of(n));
        group.bench_function(format!("{n}_members"), |b| b.iter(|| baggage.to_header()));
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(1))
        .measurement_time(std::time::Duration::from_secs(2));
    targets = criterion_benchmark
}
criterion_main!(benches);
