// Perceived vs. emitted frequency over time via egui_plot.

use std::collections::VecDeque;

use egui_plot::{Legend, Line, Plot};

/// Rolling record of window samples for the frequency plot.
pub struct FrequencyHistory {
    /// `(simulated time, perceived frequency, source frequency)`.
    samples: VecDeque<(f64, f64, f64)>,
    capacity: usize,
}

impl FrequencyHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, time: f32, perceived: f32, source: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples
            .push_back((time as f64, perceived as f64, source as f64));
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn perceived_points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|&(t, f, _)| [t, f]).collect()
    }

    fn source_points(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|&(t, _, f)| [t, f]).collect()
    }
}

impl Default for FrequencyHistory {
    /// One minute of 0.1 s windows.
    fn default() -> Self {
        Self::new(600)
    }
}

/// Draw the frequency plot in a bottom panel.
pub fn draw_frequency_plot(ctx: &egui::Context, history: &FrequencyHistory) {
    egui::TopBottomPanel::bottom("frequency_plot")
        .resizable(true)
        .min_height(160.0)
        .show(ctx, |ui| {
            ui.heading("Frequency");

            let perceived = Line::new(history.perceived_points()).name("Perceived (Hz)");
            let source = Line::new(history.source_points()).name("Source (Hz)");

            Plot::new("frequency_plot")
                .x_axis_label("Simulated time (s)")
                .y_axis_label("Frequency (Hz)")
                .include_y(0.0)
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    plot_ui.line(source);
                    plot_ui.line(perceived);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_drops_oldest_when_full() {
        let mut history = FrequencyHistory::new(3);
        for i in 0..5 {
            history.push(i as f32 * 0.1, i as f32 * 10.0, 20.0);
        }
        assert_eq!(history.len(), 3);
        let points = history.perceived_points();
        assert_eq!(points[0][1], 20.0);
        assert_eq!(points[2][1], 40.0);
        assert!(history.source_points().iter().all(|p| p[1] == 20.0));

        history.clear();
        assert!(history.is_empty());
    }
}
