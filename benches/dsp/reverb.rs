//! Benchmarks for reverb processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shimmer_dsp::dsp::reverb::keith_barr::RingOutput;
use shimmer_dsp::dsp::{DattorroReverb, KeithBarrReverb};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    for &size in BLOCK_SIZES {
        let [left, right] = test_signal(size);
        let mut out_left = vec![0.0f32; size];
        let mut out_right = vec![0.0f32; size];

        // Default plate
        let mut plate = DattorroReverb::new();
        plate.prepare(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("dattorro", size), &size, |b, &size| {
            b.iter(|| {
                plate.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });

        // Long, bright plate
        let mut plate = DattorroReverb::new();
        plate.prepare(SAMPLE_RATE);
        plate.set_decay(0.95);
        plate.set_brightness(0.9);
        group.bench_with_input(BenchmarkId::new("dattorro_long", size), &size, |b, &size| {
            b.iter(|| {
                plate.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });

        // Summed ring
        let mut ring = KeithBarrReverb::new();
        ring.prepare(SAMPLE_RATE);
        ring.set_damping(0.8);
        group.bench_with_input(BenchmarkId::new("keith_barr", size), &size, |b, &size| {
            b.iter(|| {
                ring.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });

        // Tapped ring
        let mut ring = KeithBarrReverb::new().with_output(RingOutput::StereoTaps);
        ring.prepare(SAMPLE_RATE);
        ring.set_damping(0.8);
        group.bench_with_input(BenchmarkId::new("keith_barr_taps", size), &size, |b, &size| {
            b.iter(|| {
                ring.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });
    }

    group.finish();
}
