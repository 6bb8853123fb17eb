pub mod app;
pub mod input;
pub mod plot_view;
pub mod renderer;
pub mod scene_view;
pub mod ui;

use anyhow::anyhow;
use app::App;
use doppler_core::audio::AudioPipeline;
use doppler_core::Simulation;
use winit::event_loop::EventLoop;

/// Open the window and run the interactive simulation until it is closed.
pub fn run(simulation: Simulation, audio: Option<AudioPipeline>, target_fps: u32) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().map_err(|e| anyhow!("failed to create event loop: {e}"))?;
    let mut app = App::new(simulation, audio, target_fps);
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow!("event loop error: {e}"))?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
