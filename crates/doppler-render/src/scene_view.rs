// Source, observer and wavefront rings drawn with the egui painter.

use doppler_core::constants::{ring_radius, PIXELS_PER_UNIT};
use doppler_core::{Classification, Simulation};
use egui::{Color32, Pos2, Rect, Stroke};
use glam::Vec2;

pub const BACKGROUND: Color32 = Color32::from_rgb(245, 245, 245);
pub const SOURCE_COLOR: Color32 = Color32::from_rgb(230, 41, 55);
pub const OBSERVER_COLOR: Color32 = Color32::from_rgb(0, 121, 241);

pub fn classification_color(classification: Classification) -> Color32 {
    match classification {
        Classification::Approaching => Color32::BLACK,
        Classification::JustCrossed => SOURCE_COLOR,
        Classification::Confirmed => OBSERVER_COLOR,
    }
}

/// Simulation coordinates are pixels from the top-left corner of the scene.
fn to_screen(rect: Rect, position: Vec2) -> Pos2 {
    rect.left_top() + egui::vec2(position.x, position.y)
}

/// Draw the scene into the central panel.
///
/// Each active wavefront is an outlined ring at its origin, coloured by its
/// classification. Ring radii use the compressed `scale * (1 + r / π)`
/// mapping, so they are not to scale with body positions.
pub fn draw_scene(ctx: &egui::Context, simulation: &Simulation) {
    egui::CentralPanel::default()
        .frame(egui::Frame::default().fill(BACKGROUND))
        .show(ctx, |ui| {
            let available = ui.available_size();
            let (response, painter) = ui.allocate_painter(available, egui::Sense::hover());
            let rect = response.rect;

            for wave in simulation.active_waves() {
                let center = to_screen(rect, wave.origin);
                painter.circle_stroke(
                    center,
                    ring_radius(wave.radius, PIXELS_PER_UNIT),
                    Stroke::new(1.0, classification_color(wave.classification)),
                );
            }

            let marker = ring_radius(0.0, PIXELS_PER_UNIT);
            painter.circle_filled(
                to_screen(rect, simulation.source().position()),
                marker,
                SOURCE_COLOR,
            );
            painter.circle_filled(
                to_screen(rect, simulation.observer().position),
                marker,
                OBSERVER_COLOR,
            );
        });
}
