//! Criterion benchmarks for phono-core DSP primitives
//!
//! Run with: cargo bench -p phono-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use phono_core::{
    Biquad, CoefficientTable, EqualizationChannel, FilterOrder, RingBuffer, SampleRate,
    SubsonicMode, highpass_coefficients, riaa_coefficients,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024, 4096];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");
    let coeffs = highpass_coefficients(SAMPLE_RATE, 10000.0, FilterOrder::Second);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(BenchmarkId::new("process", block_size), &block_size, |b, _| {
            let mut filter = Biquad::new(coeffs);
            b.iter(|| {
                for &sample in &input {
                    black_box(filter.process(black_box(sample)));
                }
            });
        });
    }

    group.bench_function("riaa_synthesis", |b| {
        b.iter(|| black_box(riaa_coefficients(black_box(SampleRate::Hz96000))));
    });

    group.finish();
}

fn bench_equalizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("EqualizationChannel");
    let table = CoefficientTable::new();
    let tables = *table.get(SampleRate::Hz48000);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(BenchmarkId::new("subsonic2_riaa", block_size), &block_size, |b, _| {
            let mut channel = EqualizationChannel::new(tables);
            b.iter(|| {
                for &sample in &input {
                    black_box(channel.process(black_box(sample), SubsonicMode::SecondOrder, true));
                }
            });
        });
    }

    group.finish();
}

fn bench_ring_buffer(c: &mut Criterion) {
    let input = generate_test_signal(1024);
    c.bench_function("RingBuffer/push_linearize_73", |b| {
        let mut rb = RingBuffer::new(73);
        let mut scratch = vec![0.0; 73];
        b.iter(|| {
            for &sample in &input {
                rb.push(sample);
                rb.copy_linearized(&mut scratch);
                black_box(scratch[36]);
            }
        });
    });
}

criterion_group!(benches, bench_biquad, bench_equalizer, bench_ring_buffer);
criterion_main!(benches);
