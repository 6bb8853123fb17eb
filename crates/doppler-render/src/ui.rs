// egui side panel: readouts, audio toggle, reset, key help.

use doppler_core::Simulation;

use crate::input::BINDINGS;

/// Extra UI-only state that doesn't belong in the simulation.
pub struct UiState {
    /// Whether an audio device was opened at all.
    pub audio_available: bool,
    pub play_audio: bool,
    pub gain: f32,
}

impl UiState {
    pub fn new(audio_available: bool, gain: f32) -> Self {
        Self {
            audio_available,
            play_audio: false,
            gain,
        }
    }
}

/// Requests raised by the panel this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub toggle_audio: bool,
    pub gain_changed: bool,
    pub reset: bool,
}

/// Draw the right-side panel.
pub fn draw_controls(ctx: &egui::Context, simulation: &Simulation, ui_state: &mut UiState) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("controls")
        .min_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Doppler Effect");
            ui.separator();

            let source = simulation.source();
            let observer = simulation.observer();
            let stats = simulation.stats();

            egui::Grid::new("readouts").num_columns(2).show(ui, |ui| {
                ui.label("Source frequency");
                ui.label(format!("{:.0} Hz", source.frequency));
                ui.end_row();

                ui.label("Perceived frequency");
                ui.label(format!("{:.1} Hz", simulation.perceived_frequency()));
                ui.end_row();

                ui.label("Perceived volume");
                ui.label(format!("{:.3}", simulation.perceived_volume()));
                ui.end_row();

                ui.label("Time scale");
                ui.label(format!("{:.1}×", simulation.time_scale()));
                ui.end_row();

                ui.label("Source velocity");
                ui.label(format!("({:.0}, {:.0})", source.body.velocity.x, source.body.velocity.y));
                ui.end_row();

                ui.label("Observer velocity");
                ui.label(format!("({:.0}, {:.0})", observer.velocity.x, observer.velocity.y));
                ui.end_row();

                ui.label("Active waves");
                ui.label(format!(
                    "{} / {}",
                    simulation.pool().active_count(),
                    simulation.pool().capacity()
                ));
                ui.end_row();

                ui.label("Emitted / dropped");
                ui.label(format!("{} / {}", stats.emitted, stats.dropped));
                ui.end_row();

                ui.label("Crossings");
                ui.label(stats.crossings.to_string());
                ui.end_row();

                ui.label("Elapsed");
                ui.label(format!("{:.1} s", simulation.elapsed()));
                ui.end_row();
            });

            ui.separator();

            // --- Audio ---
            if ui_state.audio_available {
                let label = if ui_state.play_audio { "Stop Audio" } else { "Play Audio" };
                if ui.button(label).clicked() {
                    actions.toggle_audio = true;
                }
                ui.label("Gain");
                if ui
                    .add(egui::Slider::new(&mut ui_state.gain, 0.0..=1.0))
                    .changed()
                {
                    actions.gain_changed = true;
                }
            } else {
                ui.label("Audio unavailable");
            }

            ui.separator();
            if ui.button("Reset").clicked() {
                actions.reset = true;
            }

            ui.separator();
            ui.label("Keys");
            egui::Grid::new("bindings").num_columns(2).show(ui, |ui| {
                for (keys, action) in BINDINGS {
                    ui.monospace(*keys);
                    ui.label(*action);
                    ui.end_row();
                }
            });
        });

    actions
}
