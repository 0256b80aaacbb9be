//! Shared signal generators for integration tests.

#![allow(dead_code)]

use std::f32::consts::TAU;

pub const SAMPLE_RATE: f32 = 48_000.0;

/// Deterministic white noise in [-1, 1] (xorshift32).
pub struct Noise {
    state: u32,
}

impl Noise {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }

    pub fn block(&mut self, len: usize) -> Vec<f32> {
        (0..len).map(|_| self.next_sample()).collect()
    }
}

pub fn sine(freq: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
        .collect()
}

pub fn impulse(len: usize) -> Vec<f32> {
    let mut signal = vec![0.0; len];
    if let Some(first) = signal.first_mut() {
        *first = 1.0;
    }
    signal
}

/// Run a stereo-out processor over mono input in blocks of `block`.
pub fn render_stereo(
    input: &[f32],
    block: usize,
    mut process: impl FnMut(&mut [&mut [f32]], &[&[f32]], usize),
) -> [Vec<f32>; 2] {
    let mut left = vec![0.0; input.len()];
    let mut right = vec![0.0; input.len()];

    for ((inp, l), r) in input
        .chunks(block)
        .zip(left.chunks_mut(block))
        .zip(right.chunks_mut(block))
    {
        let len = inp.len();
        process(&mut [l, r], &[inp], len);
    }
    [left, right]
}
