use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use zflow_compress::{CompressOptions, Compressor, compress};
use zflow_dict::{Dictionary, train_from_samples};
use zflow_engine::Directive;
use zflow_tests::{fox_text, log_record, log_samples};

fn bench_compress_fox(c: &mut Criterion) {
    let text = fox_text();

    c.bench_function("compress_fox", |b| {
        b.iter(|| compress(&text, &CompressOptions::level(3), None).unwrap());
    });
}

fn bench_compress_levels(c: &mut Criterion) {
    let data = log_samples(500).concat();
    let mut group = c.benchmark_group("compress_levels");

    #[allow(clippy::cast_possible_truncation)]
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [1, 3, 9, 19] {
        group.bench_with_input(BenchmarkId::new("level", level), &data, |b, data| {
            b.iter(|| compress(data, &CompressOptions::level(level), None).unwrap());
        });
    }

    group.finish();
}

fn bench_compress_streaming(c: &mut Criterion) {
    let data = log_samples(500).concat();
    let mut group = c.benchmark_group("compress_streaming");

    for chunk_kb in [1, 16, 128] {
        group.bench_with_input(
            BenchmarkId::new("chunk", format!("{chunk_kb}kb")),
            &data,
            |b, data| {
                b.iter(|| {
                    let session = Compressor::new(&CompressOptions::level(3), None).unwrap();
                    let mut out = Vec::new();
                    for piece in data.chunks(chunk_kb * 1024) {
                        out.extend(session.compress(piece, Directive::Continue).unwrap());
                    }
                    out.extend(session.flush(true).unwrap());
                    out
                });
            },
        );
    }

    group.finish();
}

fn bench_compress_dictionary(c: &mut Criterion) {
    let content = train_from_samples(log_samples(200), 8192).unwrap();
    let dict = Arc::new(Dictionary::new(content).unwrap());
    let record = log_record(4321);

    let mut group = c.benchmark_group("compress_small_record");

    group.bench_function("no_dictionary", |b| {
        b.iter(|| compress(&record, &CompressOptions::level(3), None).unwrap());
    });

    // The handle is built on the first iteration and reused afterwards.
    group.bench_function("dictionary", |b| {
        b.iter(|| compress(&record, &CompressOptions::level(3), Some(Arc::clone(&dict))).unwrap());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compress_fox,
    bench_compress_levels,
    bench_compress_streaming,
    bench_compress_dictionary
);
criterion_main!(benches);
