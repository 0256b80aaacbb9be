//! shimmer-live - play a shimmer reverb on a built-in test signal
//!
//! Run with: cargo run --features live-demo --bin shimmer-live [seconds]
//!
//! A short sine pluck repeats every two seconds and goes through
//! `ShimmerReverb` at 40% wet. The main thread acts as a control surface and
//! walks through a few settings over the lock-free control queue.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use std::time::{Duration, Instant};

use shimmer_dsp::{
    dsp::ShimmerReverb,
    effect::{control_channel, ControlMessage, EffectProcessor, ShimmerReverbParam},
    MAX_BLOCK_SIZE,
};

const PLUCK_PERIOD_SECONDS: f32 = 2.0;
const PLUCK_FREQUENCY: f32 = 220.0;

/// Decaying sine burst at the start of every period.
struct Pluck {
    sample_rate: f32,
    position: usize,
    period: usize,
}

impl Pluck {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            position: 0,
            period: (PLUCK_PERIOD_SECONDS * sample_rate) as usize,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let t = self.position as f32 / self.sample_rate;
        self.position = (self.position + 1) % self.period.max(1);
        let envelope = (-t * 12.0).exp();
        0.5 * envelope * (std::f32::consts::TAU * PLUCK_FREQUENCY * t).sin()
    }
}

/// (label, param, value) steps walked by the control thread.
const SCENES: [(&str, ShimmerReverbParam, f32); 6] = [
    ("octave up + octave down", ShimmerReverbParam::Shift1, 2.0),
    ("more regeneration", ShimmerReverbParam::Amount, 0.4),
    ("fifth up", ShimmerReverbParam::Shift1, 1.5),
    ("long plate", ShimmerReverbParam::Decay, 0.9),
    ("slow buildup", ShimmerReverbParam::Buildup, 80.0),
    ("dark plate", ShimmerReverbParam::Brightness, 0.2),
];

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let seconds: u64 = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse()
            .wrap_err_with(|| format!("invalid duration {:?}", arg))?,
        None => 24,
    };

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;

    println!("=== shimmer-live ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Channels: {}", channels);
    println!("Playing for {} s... Press Ctrl+C to stop", seconds);
    println!();

    let (mut tx, mut rx) = control_channel::<ShimmerReverbParam>(64);

    let mut processor = EffectProcessor::new(ShimmerReverb::new()).with_mix(0.4);
    processor.prepare(sample_rate, 2, MAX_BLOCK_SIZE);

    let mut pluck = Pluck::new(sample_rate as f32);
    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels.max(1);
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                for (l, r) in left[..frames].iter_mut().zip(right[..frames].iter_mut()) {
                    let x = pluck.next_sample();
                    *l = x;
                    *r = x;
                }

                processor.process_block(&mut rx, &mut [&mut left[..], &mut right[..]], frames);

                let out_off = frames_written * channels;
                for i in 0..frames {
                    for ch in 0..channels {
                        let sample = if ch % 2 == 0 { left[i] } else { right[i] };
                        data[out_off + i * channels + ch] = sample;
                    }
                }

                frames_written += frames;
            }
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;

    stream.play()?;

    let started = Instant::now();
    let scene_length = Duration::from_secs((seconds / SCENES.len() as u64).max(1));
    for (label, param, value) in SCENES {
        if started.elapsed() >= Duration::from_secs(seconds) {
            break;
        }
        println!("  {:<24} {:?} = {}", label, param, value);
        if tx.push(ControlMessage::SetParam { param, value }).is_err() {
            eprintln!("control queue full, dropped {:?}", param);
        }
        std::thread::sleep(scene_length);
    }

    println!();
    println!("Bypassing");
    tx.push(ControlMessage::SetEnabled(false))
        .map_err(|_| eyre!("control queue full"))?;
    std::thread::sleep(Duration::from_millis(500));

    Ok(())
}
