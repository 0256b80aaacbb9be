use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_CHANNELS;

/*
| shape      | m0   | m1            | m2      | g              | k          |
| ---------- | ---- | ------------- | ------- | -------------- | ---------- |
| low cut    | 1    | -k            | -1      | tan(πf/fs)     | 1/Q        |
| high cut   | 0    | 0             | 1       | tan(πf/fs)     | 1/Q        |
| bell       | 1    | k(A² - 1)     | 0       | tan(πf/fs)     | 1/(Q·A)    |
| low shelf  | 1    | k(A - 1)      | A² - 1  | tan(πf/fs)/√A  | 1/Q        |
| high shelf | A²   | k(1 - A)A     | 1 - A²  | tan(πf/fs)·√A  | 1/Q        |

A = 10^(gain_db / 40). Every shape runs the same two-integrator state
variable core and mixes its three taps:

    y = m0·x + m1·band + m2·low
*/

pub const NUM_BANDS: usize = 3;
pub const MIN_FREQ_HZ: f32 = 10.0;
pub const MAX_GAIN_DB: f32 = 24.0;
pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 10.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandShape {
    LowCut,
    HighCut,
    Bell,
    LowShelf,
    HighShelf,
}

/// User-facing settings of one band.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqBand {
    pub shape: BandShape,
    pub freq_hz: f32,
    pub gain_db: f32,
    pub q: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Coefficients {
    g: f32,
    k: f32,
    m0: f32,
    m1: f32,
    m2: f32,
}

struct Band {
    settings: EqBand,
    coeffs: Coefficients,
    ic1eq: [f32; MAX_CHANNELS], // First integrator's memory
    ic2eq: [f32; MAX_CHANNELS], // Second integrator's memory
}

impl Band {
    fn new(settings: EqBand) -> Self {
        Self {
            settings,
            coeffs: Coefficients::default(),
            ic1eq: [0.0; MAX_CHANNELS],
            ic2eq: [0.0; MAX_CHANNELS],
        }
    }

    fn update(&mut self, sample_rate: f32) {
        let EqBand {
            shape,
            freq_hz,
            gain_db,
            q,
        } = self.settings;

        let a = 10.0_f32.powf(gain_db / 40.0);
        let g = (PI * freq_hz / sample_rate).tan();
        let k = 1.0 / q;

        self.coeffs = match shape {
            BandShape::LowCut => Coefficients { g, k, m0: 1.0, m1: -k, m2: -1.0 },
            BandShape::HighCut => Coefficients { g, k, m0: 0.0, m1: 0.0, m2: 1.0 },
            BandShape::Bell => {
                let k = 1.0 / (q * a);
                Coefficients { g, k, m0: 1.0, m1: k * (a * a - 1.0), m2: 0.0 }
            }
            BandShape::LowShelf => Coefficients {
                g: g / a.sqrt(),
                k,
                m0: 1.0,
                m1: k * (a - 1.0),
                m2: a * a - 1.0,
            },
            BandShape::HighShelf => Coefficients {
                g: g * a.sqrt(),
                k,
                m0: a * a,
                m1: k * (1.0 - a) * a,
                m2: 1.0 - a * a,
            },
        };
    }

    #[inline]
    fn next_sample(&mut self, ch: usize, sample: f32) -> f32 {
        let Coefficients { g, k, m0, m1, m2 } = self.coeffs;

        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq[ch];
        let v1 = h * (self.ic1eq[ch] + g * v3);
        let v2 = self.ic2eq[ch] + g * v1;

        self.ic1eq[ch] = 2.0 * v1 - self.ic1eq[ch];
        self.ic2eq[ch] = 2.0 * v2 - self.ic2eq[ch];

        m0 * sample + m1 * v1 + m2 * v2
    }

    fn reset(&mut self) {
        self.ic1eq = [0.0; MAX_CHANNELS];
        self.ic2eq = [0.0; MAX_CHANNELS];
    }
}

/// Three serial state-variable bands: low cut, bell, high cut by default.
pub struct ParametricEqualizer {
    bands: [Band; NUM_BANDS],
    sample_rate: f32,
}

impl Default for ParametricEqualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParametricEqualizer {
    pub fn new() -> Self {
        let mut eq = Self {
            bands: [
                Band::new(EqBand {
                    shape: BandShape::LowCut,
                    freq_hz: 100.0,
                    gain_db: 0.0,
                    q: 0.707,
                }),
                Band::new(EqBand {
                    shape: BandShape::Bell,
                    freq_hz: 1_000.0,
                    gain_db: 0.0,
                    q: 1.0,
                }),
                Band::new(EqBand {
                    shape: BandShape::HighCut,
                    freq_hz: 8_000.0,
                    gain_db: 0.0,
                    q: 0.707,
                }),
            ],
            sample_rate: 48_000.0,
        };
        eq.prepare(48_000.0);
        eq
    }

    /// Recompute coefficients for `sample_rate` and clear state.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate.max(1.0) as f32;
        for index in 0..NUM_BANDS {
            let settings = self.bands[index].settings;
            self.set_band(index, settings.shape, settings.freq_hz, settings.gain_db, settings.q);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
    }

    /// Reconfigure one band. Frequency is clamped to `[10 Hz, 0.49·fs]`,
    /// gain to ±24 dB and Q to `[0.1, 10]`. Unknown indices are ignored.
    pub fn set_band(&mut self, index: usize, shape: BandShape, freq_hz: f32, gain_db: f32, q: f32) {
        let max_freq = 0.49 * self.sample_rate;
        let sample_rate = self.sample_rate;

        let Some(band) = self.bands.get_mut(index) else {
            return;
        };

        band.settings = EqBand {
            shape,
            freq_hz: freq_hz.clamp(MIN_FREQ_HZ.min(max_freq), max_freq),
            gain_db: gain_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB),
            q: q.clamp(MIN_Q, MAX_Q),
        };
        band.update(sample_rate);
    }

    pub fn band(&self, index: usize) -> Option<EqBand> {
        self.bands.get(index).map(|band| band.settings)
    }

    /// Filter one frame in place through every band.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        for (ch, sample) in frame.iter_mut().take(MAX_CHANNELS).enumerate() {
            let mut x = *sample;
            for band in &mut self.bands {
                x = band.next_sample(ch, x);
            }
            *sample = x;
        }
    }

    pub fn process(&mut self, output: &mut [&mut [f32]], input: &[&[f32]], num_samples: usize) {
        let channels = crate::block_channels(output.len(), input.len());
        let len = crate::block_len(output, input, channels, num_samples);

        let mut frame = [0.0; MAX_CHANNELS];
        for n in 0..len {
            for ch in 0..channels {
                frame[ch] = input[ch][n];
            }
            self.process_frame(&mut frame[..channels]);
            for ch in 0..channels {
                output[ch][n] = frame[ch];
            }
        }
        crate::fill_unwritten_channels(output, channels, len);
    }
}
