//! The three-slider parameter panel.

use crate::params::{ParamChange, ParamKey, Parameters};

/// Draw the panel for the current `values`.
///
/// Returns the edits made this frame; the caller applies them with
/// [`ParameterStore::set`](crate::params::ParameterStore::set).
pub fn show(ctx: &egui::Context, values: &Parameters, fps: f32) -> Vec<ParamChange> {
    let mut edits = Vec::new();

    egui::Window::new("Parameters")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            for key in ParamKey::ALL {
                let spec = key.spec();
                let mut value = values.get(key);

                let slider = egui::Slider::new(&mut value, spec.min..=spec.max)
                    .step_by(spec.step as f64)
                    .text(key.label());

                if ui.add(slider).changed() {
                    edits.push(ParamChange { key, value });
                }
            }

            ui.separator();
            ui.label(format!("{fps:.0} fps"));
        });

    edits
}
