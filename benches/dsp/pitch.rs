//! Benchmarks for the granular pitch shifter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shimmer_dsp::dsp::pitch::DEFAULT_GRAIN_MS;
use shimmer_dsp::dsp::GranularPitchShifter;

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_pitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pitch");

    for &size in BLOCK_SIZES {
        let [left, right] = test_signal(size);
        let mut out_left = vec![0.0f32; size];
        let mut out_right = vec![0.0f32; size];

        for &(name, ratio) in &[("octave_up", 2.0f32), ("octave_down", 0.5), ("unison", 1.0)] {
            let mut shifter = GranularPitchShifter::new(DEFAULT_GRAIN_MS, 2);
            shifter.prepare(SAMPLE_RATE, 2);
            shifter.set_pitch_ratio(ratio);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &size| {
                b.iter(|| {
                    shifter.process(
                        &mut [&mut out_left[..], &mut out_right[..]],
                        &[black_box(&left[..]), black_box(&right[..])],
                        size,
                    );
                })
            });
        }
    }

    group.finish();
}
