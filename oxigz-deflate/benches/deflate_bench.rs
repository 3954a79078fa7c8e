//! Throughput benchmarks for the streaming DEFLATE encoder.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oxigz_core::bitstream::BitWriter;
use oxigz_deflate::Deflater;

fn deflate(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut deflater = Deflater::new(BitWriter::new(&mut out));
        deflater.write(input).unwrap();
        let mut writer = deflater.finish().unwrap();
        writer.flush().unwrap();
    }
    out
}

fn generate_random(size: usize) -> Vec<u8> {
    let mut state = 0x2545F4914F6CDD1Du64;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

fn generate_repeated(size: usize) -> Vec<u8> {
    b"abcdefgh".iter().copied().cycle().take(size).collect()
}

fn generate_text_like(size: usize) -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog and then does it again "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn bench_deflate(c: &mut Criterion) {
    let cases = [
        ("random", generate_random(64 * 1024)),
        ("repeated", generate_repeated(64 * 1024)),
        ("text", generate_text_like(64 * 1024)),
    ];

    let mut group = c.benchmark_group("deflate");
    for (name, data) in &cases {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), data, |b, input| {
            b.iter(|| deflate(input));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_deflate);
criterion_main!(benches);
