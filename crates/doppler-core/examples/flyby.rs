//! Listen to a source flying past a stationary observer, without a window.
//!
//! The source starts left of the observer at half the sound speed; the tone
//! drops from roughly twice the emission rate to two thirds of it as the
//! source passes. Time runs at half speed so each frame advances wavefronts
//! by less than the crossing margin.
//!
//! Run with:
//!   cargo run -p doppler-core --example flyby

use std::time::{Duration, Instant};

use doppler_core::audio::AudioPipeline;
use doppler_core::{ControlInput, DopplerParams, Simulation};
use glam::Vec2;

const FRAME: Duration = Duration::from_micros(16_667);

fn main() {
    println!("=== Doppler flyby ===");

    let mut params = DopplerParams::default();
    params.time_scale = 0.5;
    params.source.position = Vec2::new(0.0, 200.0);
    params.source.velocity = Vec2::new(170.0, 0.0);
    params.source.frequency = 40.0;
    params.observer.position = Vec2::new(500.0, 230.0);

    let mut sim = match Simulation::new(params) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid parameters: {e}");
            return;
        }
    };

    let mut audio = match AudioPipeline::new(sim.handle(), 0.3) {
        Ok(audio) => Some(audio),
        Err(e) => {
            eprintln!("Audio unavailable, continuing silently: {e}");
            None
        }
    };
    if let Some(audio) = audio.as_mut() {
        if let Err(e) = audio.play() {
            eprintln!("Failed to start playback: {e}");
        }
    }

    let idle = ControlInput::default();
    let start = Instant::now();
    let mut last = start;
    while sim.elapsed() < 5.0 {
        let now = Instant::now();
        let report = sim.step((now - last).as_secs_f32(), &idle);
        last = now;
        if let Some(window) = report.window {
            println!(
                "t = {:5.2}s  f = {:7.1} Hz  v = {:.3}  waves = {}",
                sim.elapsed(),
                window.frequency,
                window.volume,
                sim.pool().active_count()
            );
        }
        std::thread::sleep(FRAME.saturating_sub(now.elapsed()));
    }

    if let Some(audio) = audio.as_mut() {
        let _ = audio.stop();
    }
    let stats = sim.stats();
    println!(
        "Done after {:.1}s: {} emitted, {} dropped, {} crossings.",
        start.elapsed().as_secs_f32(),
        stats.emitted,
        stats.dropped,
        stats.crossings
    );
}
