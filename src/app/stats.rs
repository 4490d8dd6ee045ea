//! Floating performance overlay: fps and a frame-time sparkline

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use std::collections::VecDeque;

use crate::theme::colors;
use crate::time::now_seconds;
use super::GalaxyApp;

const WINDOW: usize = 120;

/// Frame timing over the last [`WINDOW`] frames, platform-agnostic time
pub struct FrameStats {
    stamps: VecDeque<f64>,
    frame_ms: VecDeque<f64>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            stamps: VecDeque::with_capacity(WINDOW + 1),
            frame_ms: VecDeque::with_capacity(WINDOW + 1),
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(now_seconds());
    }

    pub fn tick_at(&mut self, now: f64) {
        if let Some(&last) = self.stamps.back() {
            self.frame_ms.push_back((now - last) * 1000.0);
            if self.frame_ms.len() > WINDOW {
                self.frame_ms.pop_front();
            }
        }
        self.stamps.push_back(now);
        if self.stamps.len() > WINDOW {
            self.stamps.pop_front();
        }
    }

    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.stamps.front(), self.stamps.back()) else {
            return 0.0;
        };
        let elapsed = last - first;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (self.stamps.len() as f64 - 1.0) / elapsed
    }

    pub fn mean_frame_ms(&self) -> f64 {
        if self.frame_ms.is_empty() {
            return 0.0;
        }
        self.frame_ms.iter().sum::<f64>() / self.frame_ms.len() as f64
    }

    pub fn history(&self) -> Vec<[f64; 2]> {
        self.frame_ms
            .iter()
            .enumerate()
            .map(|(i, &ms)| [i as f64, ms])
            .collect()
    }

    /// Forget everything; the overlay starts fresh with each scene mount
    pub fn clear(&mut self) {
        self.stamps.clear();
        self.frame_ms.clear();
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GalaxyApp {
    pub(crate) fn draw_stats(&self, ctx: &egui::Context) {
        let points = self.stats.history();
        let (core, nebula, sparkles) = self
            .scene
            .as_ref()
            .map(|s| {
                let f = s.fields();
                (f.core.field().len(), f.nebula.field().len(), f.sparkles.field().len())
            })
            .unwrap_or_default();

        egui::Area::new(egui::Id::new("stats_area"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-8.0, 36.0))
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(colors::OVERLAY)
                    .corner_radius(4.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.set_width(180.0);
                        ui.horizontal(|ui| {
                            ui.label(
                                egui::RichText::new(format!("{:.0} fps", self.stats.fps()))
                                    .color(colors::ACCENT),
                            );
                            ui.label(
                                egui::RichText::new(format!("{:.1} ms", self.stats.mean_frame_ms()))
                                    .color(colors::TEXT_SECONDARY),
                            );
                        });
                        ui.label(
                            egui::RichText::new(format!(
                                "{} stars / {} nebula / {} sparkles",
                                format_count(core),
                                format_count(nebula),
                                format_count(sparkles)
                            ))
                            .color(colors::TEXT_MUTED)
                            .small(),
                        );
                        if self.use_cpu {
                            ui.label(
                                egui::RichText::new("cpu renderer")
                                    .color(colors::TEXT_MUTED)
                                    .small(),
                            );
                        }

                        Plot::new("frame_times")
                            .height(40.0)
                            .show_axes(false)
                            .show_grid(false)
                            .allow_zoom(false)
                            .allow_drag(false)
                            .allow_scroll(false)
                            .show_background(false)
                            .include_y(0.0)
                            .include_y(33.0)
                            .show(ui, |plot_ui| {
                                plot_ui.line(
                                    Line::new(PlotPoints::from(points))
                                        .color(colors::ACCENT)
                                        .width(1.0),
                                );
                            });
                    });
            });
    }
}

/// Format a count with human-readable suffix (1234 → "1234", 30000 → "30.0k")
fn format_count(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 10_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
