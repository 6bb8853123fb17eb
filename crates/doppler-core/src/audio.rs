use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use log::{info, warn};

use crate::error::AudioError;
use crate::handle::PerceptionHandle;

/// Sine tone generator whose frequency may change every sample without
/// phase discontinuities.
pub struct SineOscillator {
    /// Current phase in cycles (wraps at 1).
    phase: f32,
    /// Sample rate in Hz.
    sample_rate: f32,
}

impl SineOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn next_sample(&mut self, frequency: f32) -> f32 {
        let sample = (TAU * self.phase).sin();
        self.phase += frequency / self.sample_rate;
        if self.phase >= 1.0 || self.phase < 0.0 {
            self.phase -= self.phase.floor();
        }
        sample
    }

    /// Fill `out` with `amplitude`-scaled samples at `frequency`.
    pub fn fill(&mut self, frequency: f32, amplitude: f32, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency) * amplitude;
        }
    }
}

/// Output stream playing the perceived frequency as a sine tone.
///
/// The callback reads frequency and volume from a [`PerceptionHandle`] once
/// per buffer; the master gain can be changed while playing.
pub struct AudioPipeline {
    stream: cpal::Stream,
    gain: Arc<AtomicU32>,
    playing: bool,
    sample_rate: u32,
}

impl AudioPipeline {
    /// Open the default output device. The stream starts paused.
    pub fn new(handle: PerceptionHandle, gain: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;
        let format = supported.sample_format();

        info!(
            "Audio: {} @ {} Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            supported.sample_rate().0,
            supported.channels(),
            format
        );

        let config: cpal::StreamConfig = supported.into();
        let gain = Arc::new(AtomicU32::new(gain.clamp(0.0, 1.0).to_bits()));
        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, handle, Arc::clone(&gain))?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, handle, Arc::clone(&gain))?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, handle, Arc::clone(&gain))?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        // Some backends start streams as soon as they are built.
        if let Err(e) = stream.pause() {
            warn!("Could not pause new audio stream: {e}");
        }

        Ok(Self {
            stream,
            gain,
            playing: false,
            sample_rate: config.sample_rate.0,
        })
    }

    pub fn play(&mut self) -> Result<(), AudioError> {
        self.stream.play()?;
        self.playing = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), AudioError> {
        self.stream.pause()?;
        self.playing = false;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_gain(&self, gain: f32) {
        self.gain.store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    handle: PerceptionHandle,
    gain: Arc<AtomicU32>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut oscillator = SineOscillator::new(config.sample_rate.0 as f32);

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frequency = handle.frequency();
            let amplitude = handle.volume() * f32::from_bits(gain.load(Ordering::Relaxed));
            for frame in data.chunks_mut(channels) {
                let value = T::from_sample(oscillator.next_sample(frequency) * amplitude);
                for sample in frame.iter_mut() {
                    *sample = value;
                }
            }
        },
        |err| warn!("Audio stream error: {err}"),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero_phase() {
        let mut osc = SineOscillator::new(48_000.0);
        assert_eq!(osc.next_sample(440.0), 0.0);
    }

    #[test]
    fn test_zero_frequency_is_silent() {
        let mut osc = SineOscillator::new(48_000.0);
        let mut out = vec![1.0; 256];
        osc.fill(0.0, 1.0, &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_output_bounded_by_amplitude() {
        let mut osc = SineOscillator::new(48_000.0);
        let mut out = vec![0.0; 48_000];
        osc.fill(1234.5, 0.25, &mut out);
        for &s in &out {
            assert!(s.abs() <= 0.25 + 1e-6, "sample out of range: {s}");
        }
    }

    #[test]
    fn test_zero_crossings_match_frequency() {
        // One second of a 440 Hz tone crosses zero twice per cycle.
        let sample_rate = 48_000.0;
        let mut osc = SineOscillator::new(sample_rate);
        let mut out = vec![0.0; sample_rate as usize];
        osc.fill(440.0, 1.0, &mut out);

        let crossings = out
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        assert!(
            (878..=882).contains(&crossings),
            "expected ~880 zero crossings, got {crossings}"
        );
    }

    #[test]
    fn test_frequency_change_is_continuous() {
        let mut osc = SineOscillator::new(48_000.0);
        let mut prev = osc.next_sample(200.0);
        for i in 0..4800 {
            let f = if i < 2400 { 200.0 } else { 800.0 };
            let s = osc.next_sample(f);
            // Max slope of an 800 Hz sine at 48 kHz is 2π·800/48000 ≈ 0.105.
            assert!((s - prev).abs() < 0.11, "jump at sample {i}: {prev} -> {s}");
            prev = s;
        }
    }
}
