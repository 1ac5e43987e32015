// Benchmarks for the hot paths: signing, verification and work checks.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::atomic::AtomicBool;

use nanokit_core::{search, validate_work, BlockHash, SecretKey, Threshold, Work};

fn bench_sign(c: &mut Criterion) {
    let secret_key = SecretKey::from_bytes([7u8; 32]);
    let hash = BlockHash([3u8; 32]);

    c.bench_function("ed25519_blake2b/sign", |b| {
        b.iter(|| secret_key.sign(&hash));
    });
}

fn bench_verify(c: &mut Criterion) {
    let secret_key = SecretKey::from_bytes([7u8; 32]);
    let public_key = secret_key.public_key();
    let hash = BlockHash([3u8; 32]);
    let signature = secret_key.sign(&hash);

    c.bench_function("ed25519_blake2b/verify", |b| {
        b.iter(|| public_key.verify(&hash, &signature));
    });
}

fn bench_validate_work(c: &mut Criterion) {
    let hash = BlockHash([3u8; 32]);
    let work = Work::from_nonce(0x1234_5678);

    c.bench_function("work/validate", |b| {
        b.iter(|| validate_work(&hash, &work, Threshold::DEFAULT));
    });
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("work/search");
    let hash = BlockHash([3u8; 32]);
    let stop = AtomicBool::new(false);

    for size in [1_000u64, 10_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| search(&hash, 0..=size - 1, Threshold(u64::MAX), &stop));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sign,
    bench_verify,
    bench_validate_work,
    bench_search
);
criterion_main!(benches);
