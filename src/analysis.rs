//! Offline measurement helpers
//!
//! Level and spectrum measurements for checking effects from tests,
//! benches and the live demo. Nothing here is meant for the audio thread:
//! the analyzer allocates when built and the free functions allocate on
//! every call.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Root-mean-square level.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum: f64 = signal.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    (sum / signal.len() as f64).sqrt() as f32
}

/// Largest absolute sample.
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Linear amplitude to decibels, floored at -240 dB.
pub fn to_db(amplitude: f32) -> f32 {
    20.0 * amplitude.abs().max(1e-12).log10()
}

/// Hann window - reduces spectral leakage
pub fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            if len > 1 {
                let denom = (len - 1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
            } else {
                1.0
            }
        })
        .collect()
}

/// Windowed FFT of a fixed size.
pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// # Arguments
    /// * `fft_size` - Number of samples per analysis (clamped to at least 2)
    /// * `sample_rate` - Audio sample rate in Hz
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            window: hann_window(fft_size),
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            sample_rate,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Width of one bin in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate / self.fft_size() as f32
    }

    /// Magnitudes of bins `0..fft_size / 2`. Shorter input is zero padded,
    /// longer input is truncated.
    pub fn magnitudes(&mut self, signal: &[f32]) -> Vec<f32> {
        for (i, bin) in self.scratch.iter_mut().enumerate() {
            let sample = signal.get(i).copied().unwrap_or(0.0);
            *bin = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let half = self.scratch.len() / 2;
        self.scratch[..half].iter().map(|bin| bin.norm()).collect()
    }

    /// Frequency of the strongest bin above DC, refined by parabolic
    /// interpolation over its neighbours.
    pub fn peak_frequency(&mut self, signal: &[f32]) -> f32 {
        let magnitudes = self.magnitudes(signal);
        if magnitudes.len() < 3 {
            return 0.0;
        }

        let mut index = 1;
        for (i, &m) in magnitudes.iter().enumerate().skip(1) {
            if m > magnitudes[index] {
                index = i;
            }
        }

        let offset = if index + 1 < magnitudes.len() {
            let [a, b, c] = [index - 1, index, index + 1].map(|i| magnitudes[i].max(1e-12).ln());
            let denom = a - 2.0 * b + c;
            if denom.abs() > f32::EPSILON {
                (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
            } else {
                0.0
            }
        } else {
            0.0
        };

        (index as f32 + offset) * self.bin_width()
    }

    /// Summed power of the bins between `low_hz` and `high_hz`.
    pub fn band_energy(&mut self, signal: &[f32], low_hz: f32, high_hz: f32) -> f32 {
        let bin_width = self.bin_width();
        self.magnitudes(signal)
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                let freq = *i as f32 * bin_width;
                freq >= low_hz && freq < high_hz
            })
            .map(|(_, m)| m * m)
            .sum()
    }
}

/// One-shot magnitude spectrum over the whole signal.
pub fn magnitude_spectrum(signal: &[f32], sample_rate: f32) -> Vec<f32> {
    SpectrumAnalyzer::new(signal.len(), sample_rate).magnitudes(signal)
}

/// One-shot dominant frequency over the whole signal.
pub fn peak_frequency(signal: &[f32], sample_rate: f32) -> f32 {
    SpectrumAnalyzer::new(signal.len(), sample_rate).peak_frequency(signal)
}
