//! Deep-space theme: near-black panels, cool grey text, warm accent

use egui::Color32;

pub mod colors {
    use super::Color32;

    // === Backgrounds ===
    pub const BG_SPACE: Color32 = Color32::from_rgb(2, 2, 8);           // #020208 - behind the galaxy
    pub const BG_PANEL: Color32 = Color32::from_rgb(8, 8, 16);          // #080810 - side panel
    pub const BG_HOVER: Color32 = Color32::from_rgb(24, 24, 40);        // #181828

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(230, 230, 240);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(150, 150, 170);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(80, 80, 100);

    pub const BORDER: Color32 = Color32::from_rgb(36, 36, 56);

    /// Core inner color, used for the fps readout and slider handles
    pub const ACCENT: Color32 = Color32::from_rgb(255, 96, 48);

    pub const ERROR: Color32 = Color32::from_rgb(220, 100, 100);

    /// Translucent fill for floating overlays
    pub const OVERLAY: Color32 = Color32::from_rgba_premultiplied(8, 8, 16, 200);
}

pub fn space_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_SPACE;
    visuals.faint_bg_color = BG_PANEL;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_HOVER;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_PANEL;

    visuals.widgets.hovered.bg_fill = BG_HOVER;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_HOVER;

    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    visuals.selection.bg_fill = ACCENT.gamma_multiply(0.6);
    visuals.selection.stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
