//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use doppler_core::{DopplerParams, HeardResetPolicy};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "doppler")]
#[command(about = "Interactive 2-D Doppler effect simulator", long_about = None)]
pub struct Args {
    /// TOML parameter file; unspecified fields keep their defaults
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Initial source frequency (Hz)
    #[arg(long, value_name = "HZ", allow_negative_numbers = true)]
    pub frequency: Option<f32>,

    /// Initial time scale
    #[arg(long, value_name = "SCALE")]
    pub time_scale: Option<f32>,

    /// Wavefront pool capacity
    #[arg(long, value_name = "N")]
    pub capacity: Option<usize>,

    /// When heard flags are cleared
    #[arg(long, value_enum, value_name = "POLICY")]
    pub heard_reset: Option<HeardResetArg>,

    /// Start without opening an audio device
    #[arg(long)]
    pub mute: bool,

    /// Run without a window for this many seconds of frames, then exit
    #[arg(long, value_name = "SECONDS")]
    pub headless: Option<f32>,

    /// Target frame rate (also the headless step rate)
    #[arg(long, value_name = "FPS", default_value_t = 60)]
    pub fps: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeardResetArg {
    EveryWindow,
    OnEmission,
}

impl From<HeardResetArg> for HeardResetPolicy {
    fn from(arg: HeardResetArg) -> Self {
        match arg {
            HeardResetArg::EveryWindow => HeardResetPolicy::EveryWindow,
            HeardResetArg::OnEmission => HeardResetPolicy::OnEmission,
        }
    }
}

impl Args {
    /// Overwrite loaded parameters with any flags given on the command line.
    pub fn apply_overrides(&self, params: &mut DopplerParams) {
        if let Some(frequency) = self.frequency {
            params.source.frequency = frequency;
        }
        if let Some(time_scale) = self.time_scale {
            params.time_scale = time_scale;
        }
        if let Some(capacity) = self.capacity {
            params.wave_capacity = capacity;
        }
        if let Some(policy) = self.heard_reset {
            params.heard_reset = policy.into();
        }
        if self.mute {
            params.audio.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_keeps_params() {
        let args = Args::parse_from(["doppler"]);
        let mut params = DopplerParams::default();
        args.apply_overrides(&mut params);
        assert_eq!(params, DopplerParams::default());
        assert_eq!(args.fps, 60);
        assert!(args.headless.is_none());
    }

    #[test]
    fn test_flags_override_params() {
        let args = Args::parse_from([
            "doppler",
            "--frequency",
            "-3",
            "--time-scale",
            "1.5",
            "--capacity",
            "64",
            "--heard-reset",
            "on-emission",
            "--mute",
        ]);
        let mut params = DopplerParams::default();
        args.apply_overrides(&mut params);
        assert_eq!(params.source.frequency, -3.0);
        assert_eq!(params.time_scale, 1.5);
        assert_eq!(params.wave_capacity, 64);
        assert_eq!(params.heard_reset, HeardResetPolicy::OnEmission);
        assert!(!params.audio.enabled, "--mute must disable audio");
    }

    #[test]
    fn test_headless_seconds() {
        let args = Args::parse_from(["doppler", "--headless", "2.5", "--fps", "120"]);
        assert_eq!(args.headless, Some(2.5));
        assert_eq!(args.fps, 120);
    }
}
