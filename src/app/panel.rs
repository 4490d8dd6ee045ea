//! Tuning panel: one slider per knob plus the light color

use eframe::egui;
use tracing::debug;

use crate::params::{TuningParameters, PARAM_SPECS};
use crate::theme::colors;
use super::GalaxyApp;

impl GalaxyApp {
    pub(crate) fn render_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tuning")
            .default_width(240.0)
            .min_width(200.0)
            .resizable(true)
            .frame(egui::Frame::new().fill(colors::BG_PANEL).inner_margin(8.0))
            .show(ctx, |ui| {
                let group_frame = egui::Frame::new()
                    .stroke(egui::Stroke::new(1.0, colors::BORDER))
                    .corner_radius(4.0)
                    .inner_margin(6.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("Galaxy:").color(colors::TEXT_MUTED));
                    tuning_sliders(ui, &mut self.params);
                });

                ui.add_space(8.0);

                group_frame.show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("Light color").color(colors::TEXT_MUTED));
                        ui.color_edit_button_rgb(&mut self.params.light_color);
                    });
                });

                ui.add_space(8.0);

                if ui.button("Reset").clicked() {
                    debug!("Tuning parameters reset to defaults");
                    self.params = TuningParameters::default();
                }
                ui.label(
                    egui::RichText::new("Double-click a slider to reset it")
                        .color(colors::TEXT_MUTED)
                        .small(),
                );
            });
    }
}

/// Sliders built from the knob specs. Values go through `set`, so they stay
/// clamped no matter what the widget hands back.
fn tuning_sliders(ui: &mut egui::Ui, params: &mut TuningParameters) {
    let defaults = TuningParameters::default();
    let full_width = ui.available_width();
    ui.spacing_mut().slider_width = full_width;

    for spec in PARAM_SPECS {
        let Some(mut value) = params.get(spec.name) else {
            continue;
        };
        ui.add_space(4.0);
        ui.label(
            egui::RichText::new(format!("{}: {}", spec.label, format_value(value, spec.step)))
                .color(colors::TEXT_SECONDARY),
        );
        let response = ui.add(
            egui::Slider::new(&mut value, spec.min..=spec.max)
                .step_by(spec.step)
                .clamping(egui::SliderClamping::Always)
                .show_value(false),
        );
        if response.double_clicked() {
            if let Some(default) = defaults.get(spec.name) {
                value = default;
            }
        }
        if (response.changed() || response.double_clicked()) && params.set(spec.name, value) {
            debug!(knob = spec.name, value, "Tuning parameter changed");
        }
    }
}

/// Enough decimals to show one step
fn format_value(value: f64, step: f64) -> String {
    if step >= 1.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10() - 1e-9).ceil().max(0.0) as usize;
        format!("{:.*}", decimals, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_formatting_follows_step() {
        assert_eq!(format_value(30000.0, 1000.0), "30000");
        assert_eq!(format_value(0.4, 0.05), "0.40");
        assert_eq!(format_value(0.001, 0.0005), "0.0010");
        assert_eq!(format_value(3.0, 0.1), "3.0");
    }
}
