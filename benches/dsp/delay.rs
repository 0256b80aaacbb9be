//! Benchmarks for delay line processing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shimmer_dsp::dsp::DelayLine;

use crate::{test_signal, BLOCK_SIZES};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    for &size in BLOCK_SIZES {
        let [left, right] = test_signal(size);
        let mut out_left = vec![0.0f32; size];
        let mut out_right = vec![0.0f32; size];

        // 250 ms at 48 kHz
        let mut delay = DelayLine::new(12_000, 2);
        delay.set_delay_samples(12_000);
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, &size| {
            b.iter(|| {
                delay.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });

        // Slow sweep of a fractional offset
        let modulation: Vec<f32> = (0..size)
            .map(|i| 48.0 + 24.0 * (i as f32 * 0.01).sin())
            .collect();
        let mut delay = DelayLine::new(1_024, 2);
        delay.set_delay_samples(256);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, &size| {
            b.iter(|| {
                delay.process_modulated(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    &[&modulation[..], &modulation[..]],
                    size,
                );
            })
        });
    }

    group.finish();
}
