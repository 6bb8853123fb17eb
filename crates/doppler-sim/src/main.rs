mod cli;
mod headless;

use anyhow::{Context, Result};
use clap::Parser;
use doppler_core::audio::AudioPipeline;
use doppler_core::{DopplerParams, Simulation};
use log::{info, warn};

use crate::cli::Args;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => DopplerParams::load(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => DopplerParams::default(),
    };
    args.apply_overrides(&mut params);
    params.validate().context("invalid parameters")?;

    info!(
        "Source at ({}, {}) emitting {} Hz, observer at ({}, {}), time scale {}",
        params.source.position.x,
        params.source.position.y,
        params.source.frequency,
        params.observer.position.x,
        params.observer.position.y,
        params.time_scale
    );

    let audio_enabled = params.audio.enabled;
    let gain = params.audio.gain;
    let mut simulation = Simulation::new(params)?;

    if let Some(seconds) = args.headless {
        let summary = headless::run(&mut simulation, seconds, args.fps);
        info!(
            "Headless run: {} frames, {:.2} simulated s, {} emitted, {} dropped, {} retired, {} crossings, {} windows",
            summary.frames,
            summary.simulated_seconds,
            summary.stats.emitted,
            summary.stats.dropped,
            summary.stats.retired,
            summary.stats.crossings,
            summary.stats.windows
        );
        info!(
            "Final perceived frequency {:.2} Hz, volume {:.4}",
            summary.perceived_frequency, summary.perceived_volume
        );
        return Ok(());
    }

    let audio = if audio_enabled {
        match AudioPipeline::new(simulation.handle(), gain) {
            Ok(mut audio) => {
                if let Err(e) = audio.play() {
                    warn!("Audio opened but failed to start: {e}");
                }
                Some(audio)
            }
            Err(e) => {
                warn!("Audio disabled: {e}");
                None
            }
        }
    } else {
        info!("Audio muted");
        None
    };

    doppler_render::run(simulation, audio, args.fps)
}
