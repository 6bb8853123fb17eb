// ApplicationHandler, event loop, frame pacing, state orchestration.

use std::cell::Cell;
use std::time::{Duration, Instant};

use egui_winit_vulkano::{Gui, GuiConfig};
use doppler_core::audio::AudioPipeline;
use doppler_core::Simulation;
use log::{error, info, warn};
use vulkano::sync::GpuFuture;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowId,
};

use crate::input::HeldControls;
use crate::plot_view::{self, FrequencyHistory};
use crate::renderer::{Renderer, WINDOW_TITLE};
use crate::scene_view;
use crate::ui::{self, UiActions, UiState};

/// Longest frame fed to the simulation, so a stall (window drag, debugger)
/// doesn't fling the bodies across the scene.
const MAX_FRAME_TIME: f32 = 0.1;

/// Wall-clock pacing and FPS measurement.
pub(crate) struct FrameClock {
    period: Duration,
    last_frame: Instant,
    next_frame: Instant,
    fps_window_start: Instant,
    fps_frames: u32,
    fps: f32,
}

impl FrameClock {
    pub(crate) fn new(target_fps: u32, now: Instant) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));
        Self {
            period,
            last_frame: now,
            next_frame: now,
            fps_window_start: now,
            fps_frames: 0,
            fps: 0.0,
        }
    }

    /// Forget time spent before the window existed.
    pub(crate) fn restart(&mut self, now: Instant) {
        self.last_frame = now;
        self.next_frame = now;
        self.fps_window_start = now;
        self.fps_frames = 0;
    }

    /// Mark a frame at `now`; returns the clamped frame time in seconds.
    pub(crate) fn tick(&mut self, now: Instant) -> f32 {
        let frame_time = now
            .saturating_duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_TIME);
        self.last_frame = now;
        self.next_frame = now + self.period;

        self.fps_frames += 1;
        let window = now.saturating_duration_since(self.fps_window_start);
        if window >= Duration::from_secs(1) {
            self.fps = self.fps_frames as f32 / window.as_secs_f32();
            self.fps_frames = 0;
            self.fps_window_start = now;
        }
        frame_time
    }

    pub(crate) fn next_frame(&self) -> Instant {
        self.next_frame
    }

    pub(crate) fn fps(&self) -> f32 {
        self.fps
    }
}

pub struct App {
    renderer: Option<Renderer>,
    gui: Option<Gui>,
    simulation: Simulation,
    audio: Option<AudioPipeline>,
    ui_state: UiState,
    held: HeldControls,
    history: FrequencyHistory,
    clock: FrameClock,
    /// Startup failure raised inside the event loop, reported by `run`.
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(simulation: Simulation, audio: Option<AudioPipeline>, target_fps: u32) -> Self {
        let gain = audio
            .as_ref()
            .map(AudioPipeline::gain)
            .unwrap_or(simulation.params().audio.gain);
        let mut ui_state = UiState::new(audio.is_some(), gain);
        ui_state.play_audio = audio.as_ref().is_some_and(AudioPipeline::is_playing);

        Self {
            renderer: None,
            gui: None,
            simulation,
            audio,
            ui_state,
            held: HeldControls::default(),
            history: FrequencyHistory::default(),
            clock: FrameClock::new(target_fps, Instant::now()),
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn stop_audio(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            if let Err(e) = audio.stop() {
                warn!("Failed to stop audio: {e}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        let renderer = match Renderer::new(event_loop) {
            Ok(r) => r,
            Err(e) => {
                error!("Renderer setup failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
                return;
            }
        };

        let gui = Gui::new(
            event_loop,
            renderer.surface.clone(),
            renderer.queue.clone(),
            renderer.swapchain_format(),
            GuiConfig {
                is_overlay: false,
                allow_srgb_render_target: true,
                ..Default::default()
            },
        );

        renderer.window.request_redraw();
        self.renderer = Some(renderer);
        self.gui = Some(gui);
        self.clock.restart(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gui) = self.gui.as_mut() {
            gui.update(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.stop_audio();
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.recreate_swapchain = true;
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape && event.state == ElementState::Pressed {
                        self.stop_audio();
                        event_loop.exit();
                    } else {
                        self.held.handle_key(code, event.state);
                    }
                }
            }
            WindowEvent::Focused(false) => self.held.clear(),
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // The simulation runs continuously, so keep redrawing at the target rate.
        let next_frame = self.clock.next_frame();
        if Instant::now() >= next_frame {
            if let Some(renderer) = self.renderer.as_ref() {
                renderer.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(next_frame));
    }
}

impl App {
    fn render_frame(&mut self) {
        let frame_time = self.clock.tick(Instant::now());
        let input = self.held.input(&self.simulation.params().controls);
        let report = self.simulation.step(frame_time, &input);
        if let Some(sample) = report.window {
            self.history.push(
                self.simulation.elapsed(),
                sample.frequency,
                self.simulation.source().frequency,
            );
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        renderer.window.set_title(&format!(
            "{WINDOW_TITLE} ({:.0} FPS)",
            self.clock.fps()
        ));

        let (image_index, acquire_future) = match renderer.begin_frame() {
            Ok(Some(r)) => r,
            Ok(None) => return,
            Err(e) => {
                error!("{e:#}");
                return;
            }
        };
        let before_future = renderer.take_previous_frame_end().join(acquire_future);
        let image_view = renderer.image_views[image_index as usize].clone();

        let Some(gui) = self.gui.as_mut() else {
            return;
        };
        let actions = Cell::new(UiActions::default());
        {
            let simulation = &self.simulation;
            let ui_state = &mut self.ui_state;
            let history = &self.history;
            gui.immediate_ui(|gui| {
                let ctx = gui.context();
                actions.set(ui::draw_controls(&ctx, simulation, ui_state));
                plot_view::draw_frequency_plot(&ctx, history);
                scene_view::draw_scene(&ctx, simulation);
            });
        }
        let after_future = gui.draw_on_image(before_future, image_view);

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.present(after_future, image_index);
        }

        self.apply_actions(actions.get());
    }

    fn apply_actions(&mut self, actions: UiActions) {
        if actions.reset {
            info!("Simulation reset");
            self.simulation.reset();
            self.history.clear();
            self.held.clear();
        }

        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        if actions.gain_changed {
            audio.set_gain(self.ui_state.gain);
        }
        if actions.toggle_audio {
            let result = if audio.is_playing() {
                audio.stop()
            } else {
                audio.play()
            };
            match result {
                Ok(()) => info!("Audio {}", if audio.is_playing() { "started" } else { "stopped" }),
                Err(e) => warn!("Audio toggle failed: {e}"),
            }
            self.ui_state.play_audio = audio.is_playing();
        }
    }
}
