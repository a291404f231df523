#[macro_use]
extern crate criterion;
extern crate fastac;
extern crate rand;

use criterion::Criterion;

use fastac::{AdaptiveModel, ArithmeticCodec, StaticModel};
use rand::prelude::*;

const NUM_SYMBOLS: usize = 16_384;
const BUFFER_SIZE: usize = 1 << 16;

fn byte_symbols() -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(0xBE7C);
    (0..NUM_SYMBOLS).map(|_| rng.gen_range(0..256)).collect()
}

fn adaptive_encode_benchmark(c: &mut Criterion) {
    let symbols = byte_symbols();
    c.bench_function("adaptive_encode_256", move |b| {
        let mut codec = ArithmeticCodec::with_buffer(BUFFER_SIZE).unwrap();
        let mut model = AdaptiveModel::new(256).unwrap();
        b.iter(|| {
            model.reset();
            codec.start_encoder();
            for &sym in &symbols {
                codec.encode_adaptive(sym, &mut model);
            }
            codec.stop_encoder()
        })
    });
}

fn adaptive_decode_benchmark(c: &mut Criterion) {
    let symbols = byte_symbols();
    c.bench_function("adaptive_decode_256", move |b| {
        let mut codec = ArithmeticCodec::with_buffer(BUFFER_SIZE).unwrap();
        let mut model = AdaptiveModel::new(256).unwrap();
        codec.start_encoder();
        for &sym in &symbols {
            codec.encode_adaptive(sym, &mut model);
        }
        codec.stop_encoder();

        b.iter(|| {
            model.reset();
            codec.start_decoder();
            for _ in 0..symbols.len() {
                codec.decode_adaptive(&mut model);
            }
            codec.stop_decoder();
        })
    });
}

fn static_encode_benchmark(c: &mut Criterion) {
    let symbols = byte_symbols();
    c.bench_function("static_encode_256", move |b| {
        let mut codec = ArithmeticCodec::with_buffer(BUFFER_SIZE).unwrap();
        let model = StaticModel::new(256).unwrap();
        b.iter(|| {
            codec.start_encoder();
            for &sym in &symbols {
                codec.encode_static(sym, &model);
            }
            codec.stop_encoder()
        })
    });
}

fn static_decode_benchmark(c: &mut Criterion) {
    let symbols = byte_symbols();
    c.bench_function("static_decode_256", move |b| {
        let mut codec = ArithmeticCodec::with_buffer(BUFFER_SIZE).unwrap();
        let model = StaticModel::new(256).unwrap();
        codec.start_encoder();
        for &sym in &symbols {
            codec.encode_static(sym, &model);
        }
        codec.stop_encoder();

        b.iter(|| {
            codec.start_decoder();
            for _ in 0..symbols.len() {
                codec.decode_static(&model);
            }
            codec.stop_decoder();
        })
    });
}

fn raw_bits_benchmark(c: &mut Criterion) {
    c.bench_function("raw_put_get_bits", move |b| {
        let mut codec = ArithmeticCodec::with_buffer(BUFFER_SIZE).unwrap();
        b.iter(|| {
            codec.start_encoder();
            for value in 0..16_384u32 {
                codec.put_bits(value, 14);
            }
            codec.stop_encoder();

            codec.start_decoder();
            for _ in 0..16_384 {
                codec.get_bits(14);
            }
            codec.stop_decoder();
        })
    });
}

criterion_group!(
    benches,
    adaptive_encode_benchmark,
    adaptive_decode_benchmark,
    static_encode_benchmark,
    static_decode_benchmark,
    raw_bits_benchmark
);
criterion_main!(benches);
