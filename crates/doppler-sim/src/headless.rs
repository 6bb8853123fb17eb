//! Window-less batch run at a fixed frame time.

use doppler_core::{ControlInput, SimStats, Simulation};
use log::debug;

/// What a headless run ended with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessSummary {
    pub frames: u64,
    pub simulated_seconds: f32,
    pub stats: SimStats,
    pub perceived_frequency: f32,
    pub perceived_volume: f32,
}

/// Step `simulation` for `seconds` worth of frames at `fps`, with no input.
///
/// The frame count is fixed up front, so a zero time scale still terminates.
pub fn run(simulation: &mut Simulation, seconds: f32, fps: u32) -> HeadlessSummary {
    let fps = fps.max(1);
    let frame_time = 1.0 / fps as f32;
    let frames = (seconds.max(0.0) * fps as f32).round() as u64;
    let idle = ControlInput::default();

    for _ in 0..frames {
        let report = simulation.step(frame_time, &idle);
        if let Some(sample) = report.window {
            debug!(
                "t = {:.2}: {} heard, f = {:.2}, v = {:.4}",
                simulation.elapsed(),
                sample.count,
                sample.frequency,
                sample.volume
            );
        }
    }

    HeadlessSummary {
        frames,
        simulated_seconds: simulation.elapsed(),
        stats: simulation.stats(),
        perceived_frequency: simulation.perceived_frequency(),
        perceived_volume: simulation.perceived_volume(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doppler_core::DopplerParams;

    #[test]
    fn test_runs_requested_frames() {
        let mut params = DopplerParams::default();
        params.time_scale = 1.0;
        params.source.frequency = 2.0;
        let mut sim = Simulation::new(params).unwrap();

        let summary = run(&mut sim, 3.0, 60);
        assert_eq!(summary.frames, 180);
        assert!(
            (summary.simulated_seconds - 3.0).abs() < 1e-3,
            "time scale 1 should simulate 3 s, got {}",
            summary.simulated_seconds
        );
        assert!(
            (4..=6).contains(&summary.stats.emitted),
            "expected ~5 emissions at 2 Hz, got {}",
            summary.stats.emitted
        );
        assert!(
            (29..=30).contains(&summary.stats.windows),
            "expected one window per 0.1 s, got {}",
            summary.stats.windows
        );
    }

    #[test]
    fn test_zero_time_scale_terminates() {
        let mut params = DopplerParams::default();
        params.time_scale = 0.0;
        params.source.frequency = 10.0;
        let mut sim = Simulation::new(params).unwrap();

        let summary = run(&mut sim, 1.0, 30);
        assert_eq!(summary.frames, 30);
        assert_eq!(summary.simulated_seconds, 0.0);
        assert_eq!(summary.stats.emitted, 0, "frozen time emits nothing");
    }
}
