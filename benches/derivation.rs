//! Address derivation benchmarks: key parsing and per-chain discovery.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ratiobook::wallet::{self, ExtendedPublicKey};

const BIP84_ZPUB: &str = "zpub6rFR7y4Q2AijBEqTUquhVz398htDFrtymD9xYYfG1m4wAcvPhXNfE3EfH1r1ADqtfSdVCToUG868RvUUkgDKf31mGDtKsAYz2oz2AGutZYs";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_zpub", |b| {
        b.iter(|| black_box(BIP84_ZPUB).parse::<ExtendedPublicKey>())
    });
}

fn bench_derive(c: &mut Criterion) {
    let key: ExtendedPublicKey = BIP84_ZPUB.parse().unwrap();
    let mut group = c.benchmark_group("derive_chain");

    for limit in [20u32, 100, 500] {
        group.throughput(Throughput::Elements(limit as u64));
        group.bench_with_input(BenchmarkId::from_parameter(limit), &limit, |b, &limit| {
            b.iter(|| wallet::derive(black_box(&key), 0, limit))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_derive);
criterion_main!(benches);
