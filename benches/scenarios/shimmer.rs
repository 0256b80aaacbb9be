//! Benchmarks for complete shimmer chains.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use shimmer_dsp::dsp::{Shimmer, ShimmerReverb};
use shimmer_dsp::effect::{EffectProcessor, NoControl};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_shimmer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/shimmer");

    for &size in BLOCK_SIZES {
        let [left, right] = test_signal(size);
        let mut buf_left = left.clone();
        let mut buf_right = right.clone();

        // Shifters only
        let mut basic = EffectProcessor::new(Shimmer::default()).with_mix(0.5);
        basic.prepare(SAMPLE_RATE, 2, size);
        group.bench_with_input(BenchmarkId::new("basic", size), &size, |b, &size| {
            b.iter(|| {
                buf_left.copy_from_slice(&left);
                buf_right.copy_from_slice(&right);
                basic.process_block(
                    &mut NoControl,
                    black_box(&mut [&mut buf_left[..], &mut buf_right[..]]),
                    size,
                );
            })
        });

        // Shimmer into ring and plate with regeneration
        let mut full = EffectProcessor::new(ShimmerReverb::new()).with_mix(0.4);
        full.prepare(SAMPLE_RATE, 2, size);
        full.effect_mut().set_amount(0.4);
        group.bench_with_input(BenchmarkId::new("reverb", size), &size, |b, &size| {
            b.iter(|| {
                buf_left.copy_from_slice(&left);
                buf_right.copy_from_slice(&right);
                full.process_block(
                    &mut NoControl,
                    black_box(&mut [&mut buf_left[..], &mut buf_right[..]]),
                    size,
                );
            })
        });
    }

    group.finish();
}
