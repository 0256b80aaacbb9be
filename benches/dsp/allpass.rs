//! Benchmarks for all-pass sections.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shimmer_dsp::dsp::AllPass;

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_allpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/allpass");

    for &size in BLOCK_SIZES {
        let [left, right] = test_signal(size);
        let mut out_left = vec![0.0f32; size];
        let mut out_right = vec![0.0f32; size];

        let mut allpass = AllPass::new(4.7, 0.75, 2);
        allpass.prepare(SAMPLE_RATE, 2);
        group.bench_with_input(BenchmarkId::new("stereo", size), &size, |b, &size| {
            b.iter(|| {
                allpass.process(
                    &mut [&mut out_left[..], &mut out_right[..]],
                    &[black_box(&left[..]), black_box(&right[..])],
                    size,
                );
            })
        });

        // Four in series, as in a reverb's input diffusion
        let mut diffusers = [
            AllPass::new(4.7, 0.75, 1),
            AllPass::new(3.6, 0.75, 1),
            AllPass::new(12.7, 0.625, 1),
            AllPass::new(9.3, 0.625, 1),
        ];
        group.bench_with_input(BenchmarkId::new("diffusion_chain", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &sample in &left {
                    let mut x = black_box(sample);
                    for diffuser in &mut diffusers {
                        x = diffuser.process_mono(x);
                    }
                    sum += x;
                }
                sum
            })
        });

        // Chorused, as in the plate's tank
        let mut allpass = AllPass::new(22.4, 0.7, 1).with_modulation_headroom(4.0);
        allpass.prepare(SAMPLE_RATE, 1);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in left.iter().enumerate() {
                    let offset = 96.0 + 48.0 * (i as f32 * 0.001).sin();
                    sum += allpass.process_mono_modulated(black_box(sample), offset);
                }
                sum
            })
        });
    }

    group.finish();
}
