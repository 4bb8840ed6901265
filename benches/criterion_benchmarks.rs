use blockpress::codec::{delta, rle};
use blockpress::dedup::Fingerprint;
use blockpress::{Engine, EngineConfig};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

/// Block-like data: random bytes interleaved with zero padding, roughly
/// the shape of serialized transactions with fixed-width fields.
fn gen_block(size: usize, seed: u64) -> Vec<u8> {
    let noise = gen_data(size, seed);
    let mut out = Vec::with_capacity(size);
    for chunk in noise.chunks(64) {
        out.extend_from_slice(&chunk[..chunk.len() / 2]);
        out.resize(out.len() + chunk.len() - chunk.len() / 2, 0);
    }
    out
}

fn enabled() -> Engine {
    Engine::with_config(EngineConfig::enabled(6))
}

fn bench_rle_encode(c: &mut Criterion) {
    let mut g = c.benchmark_group("rle_encode_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_block(size, 1);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(rle::encode(black_box(&data))));
        });
    }
    g.finish();
}

fn bench_rle_decode(c: &mut Criterion) {
    let mut g = c.benchmark_group("rle_decode_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let encoded = rle::encode(&gen_block(size, 2));
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(rle::decode(black_box(&encoded))));
        });
    }
    g.finish();
}

fn bench_block_container(c: &mut Criterion) {
    let mut g = c.benchmark_group("block_container");
    let engine = enabled();
    let block = gen_block(1024 * 1024, 3);
    let packed = engine.compress_block(&block).unwrap();
    g.throughput(Throughput::Bytes(block.len() as u64));
    g.bench_function("compress_block", |b| {
        b.iter(|| black_box(engine.compress_block(black_box(&block)).unwrap()));
    });
    g.bench_function("decompress_block", |b| {
        b.iter(|| black_box(engine.decompress_block(black_box(&packed)).unwrap()));
    });
    g.finish();
}

fn bench_batch_blocks(c: &mut Criterion) {
    let mut g = c.benchmark_group("batch_blocks");
    let engine = enabled();
    let blocks: Vec<Vec<u8>> = (0..64).map(|i| gen_block(64 * 1024, 10 + i)).collect();
    g.throughput(Throughput::Bytes((blocks.len() * 64 * 1024) as u64));
    g.bench_function("compress_blocks_64x64k", |b| {
        b.iter(|| black_box(engine.compress_blocks(black_box(&blocks)).unwrap()));
    });
    g.finish();
}

fn bench_transactions(c: &mut Criterion) {
    let mut g = c.benchmark_group("transaction_dedup");
    for size in [256usize, 4096] {
        let tx = gen_block(size, 4);
        g.throughput(Throughput::Bytes(size as u64));

        g.bench_with_input(BenchmarkId::new("fingerprint", size), &size, |b, _| {
            b.iter(|| black_box(Fingerprint::of(black_box(&tx))));
        });

        // Steady state: the pattern is cached, every call is a hit.
        let engine = enabled();
        engine.compress_transaction(&tx).unwrap();
        g.bench_with_input(BenchmarkId::new("compress_hit", size), &size, |b, _| {
            b.iter(|| black_box(engine.compress_transaction(black_box(&tx)).unwrap()));
        });

        let reference = engine.compress_transaction(&tx).unwrap();
        g.bench_with_input(BenchmarkId::new("resolve_reference", size), &size, |b, _| {
            b.iter(|| black_box(engine.decompress_transaction(black_box(&reference)).unwrap()));
        });
    }
    g.finish();
}

fn bench_delta(c: &mut Criterion) {
    let mut g = c.benchmark_group("xor_delta");
    let base = gen_block(1024 * 1024, 5);
    let mut target = base.clone();
    target.extend_from_slice(&gen_data(4096, 6));
    let d = delta::encode(&base, &target).unwrap();
    g.throughput(Throughput::Bytes(target.len() as u64));
    g.bench_function("encode", |b| {
        b.iter(|| black_box(delta::encode(black_box(&base), black_box(&target)).unwrap()));
    });
    g.bench_function("decode", |b| {
        b.iter(|| black_box(delta::decode(black_box(&base), black_box(&d)).unwrap()));
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_rle_encode,
    bench_rle_decode,
    bench_block_container,
    bench_batch_blocks,
    bench_transactions,
    bench_delta
);
criterion_main!(benches);
