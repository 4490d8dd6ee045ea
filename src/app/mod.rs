//! Galaxy egui app
//!
//! Runs on both native and WASM. The 3D subtree (scene update + paint) sits
//! behind a [`FaultBoundary`]; the header, tuning panel and stats overlay are
//! outside it and keep working when it trips.

mod panel;
mod stats;
mod view;

use eframe::egui;
use tracing::{info, warn};

use crate::boundary::FaultBoundary;
use crate::params::TuningParameters;
use crate::render::{FieldUpload, GalaxyRenderer};
use crate::scene::Scene;
use crate::theme::{colors, space_visuals};

#[cfg(target_arch = "wasm32")]
use crate::context_loss::ContextLossWatch;

pub use stats::FrameStats;

pub struct GalaxyApp {
    /// Knobs; written by the panel only
    pub(crate) params: TuningParameters,
    /// None before mount and after the boundary trips
    pub(crate) scene: Option<Scene>,
    pub(crate) boundary: FaultBoundary,
    pub(crate) stats: FrameStats,
    /// Overlay lives as long as the app, independent of scene health
    pub(crate) overlay_mounted: bool,
    /// Use CPU rendering (--use-cpu on native, fallback if no wgpu)
    pub(crate) use_cpu: bool,
    /// Off-screen texture of the GPU renderer (None in CPU mode)
    pub(crate) galaxy_texture_id: Option<egui::TextureId>,
    /// Field uploads for core, nebula, sparkles; resent each frame, rebuilt on change
    pub(crate) gpu_fields: [Option<FieldUpload>; 3],
    /// Bumped on every scene mount
    pub(crate) mount_epoch: u64,
    pub(crate) show_panel: bool,
    #[cfg(target_arch = "wasm32")]
    context_loss: Option<ContextLossWatch>,
}

/// Register the GPU renderer with egui-wgpu and return its texture id.
fn register_renderer(cc: &eframe::CreationContext<'_>) -> Option<egui::TextureId> {
    let render_state = cc.wgpu_render_state.as_ref()?;
    let device = &render_state.device;
    let renderer = GalaxyRenderer::new(device, render_state.target_format);
    let mut egui_renderer = render_state.renderer.write();
    let texture_id = egui_renderer.register_native_texture(
        device,
        &renderer.create_view(),
        egui_wgpu::wgpu::FilterMode::Linear,
    );
    egui_renderer.callback_resources.insert(renderer);
    info!(format = ?render_state.target_format, "GPU galaxy renderer registered");
    Some(texture_id)
}

impl GalaxyApp {
    /// Create new app for WASM platform
    #[cfg(target_arch = "wasm32")]
    pub fn new(cc: &eframe::CreationContext<'_>, context_loss: Option<ContextLossWatch>) -> Self {
        cc.egui_ctx.set_visuals(space_visuals());

        let galaxy_texture_id = register_renderer(cc);
        // fallback to CPU if wgpu unavailable
        let use_cpu = galaxy_texture_id.is_none();
        if use_cpu {
            warn!("No wgpu render state, using CPU renderer");
        }

        let mut app = Self::with_renderer(galaxy_texture_id, use_cpu);
        app.context_loss = context_loss;
        app
    }

    /// Create new app for native platform
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(cc: &eframe::CreationContext<'_>, use_cpu: bool) -> Self {
        cc.egui_ctx.set_visuals(space_visuals());

        // Register GPU renderer unless CPU mode requested
        let galaxy_texture_id = if use_cpu { None } else { register_renderer(cc) };
        if !use_cpu && galaxy_texture_id.is_none() {
            warn!("No wgpu render state, using CPU renderer");
        }
        let use_cpu = use_cpu || galaxy_texture_id.is_none();
        info!(use_cpu, "Renderer selected");

        Self::with_renderer(galaxy_texture_id, use_cpu)
    }

    fn with_renderer(galaxy_texture_id: Option<egui::TextureId>, use_cpu: bool) -> Self {
        let mut app = Self {
            params: TuningParameters::load(),
            scene: None,
            boundary: FaultBoundary::new(),
            stats: FrameStats::new(),
            overlay_mounted: true,
            use_cpu,
            galaxy_texture_id,
            gpu_fields: [None, None, None],
            mount_epoch: 0,
            show_panel: true,
            #[cfg(target_arch = "wasm32")]
            context_loss: None,
        };
        app.mount_scene();
        app
    }

    /// Build a fresh scene inside the boundary. Any previous one is torn down.
    pub(crate) fn mount_scene(&mut self) {
        self.unmount_scene();
        self.mount_epoch += 1;
        self.stats.clear();
        let params = &self.params;
        self.scene = self.boundary.run(|| Scene::build(params));
        if self.scene.is_some() {
            info!(epoch = self.mount_epoch, "Scene mounted");
        }
    }

    /// Stop the timelines and drop the scene; the stats overlay goes with it.
    pub(crate) fn unmount_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.teardown();
        }
        self.gpu_fields = [None, None, None];
    }

    /// Explicit user retry after the boundary tripped
    pub(crate) fn retry(&mut self) {
        info!("Retrying scene mount");
        self.boundary.reset();
        self.mount_scene();
    }

    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let panel_text = if self.show_panel { "Tuning <<<" } else { "Tuning >>>" };
            if ui.button(egui::RichText::new(panel_text)).clicked() {
                self.show_panel = !self.show_panel;
            }
            ui.add_space(10.0);
            ui.label(egui::RichText::new("galaxy").color(colors::TEXT_SECONDARY));

            if self.context_lost() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.colored_label(colors::ERROR, "graphics context lost");
                });
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn context_lost(&self) -> bool {
        self.context_loss.as_ref().is_some_and(|w| w.is_lost())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn context_lost(&self) -> bool {
        false
    }

    /// Central panel body: the fallback once the boundary tripped, else the galaxy
    pub(crate) fn render_central(&mut self, ui: &mut egui::Ui) {
        match self.boundary.fallback_text() {
            Some(message) => self.render_fallback(ui, &message),
            None => self.render_galaxy(ui),
        }
    }

    /// Centred static message in place of the 3D subtree
    fn render_fallback(&mut self, ui: &mut egui::Ui, message: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.label(egui::RichText::new(message).color(colors::ERROR));
            ui.add_space(8.0);
            if ui.button("Retry").clicked() {
                self.retry();
            }
        });
    }
}

impl eframe::App for GalaxyApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        // Continuous animation
        ctx.request_repaint();
        self.stats.tick();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_PANEL).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        // Side panel must be shown before CentralPanel
        if self.show_panel {
            self.render_panel(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_SPACE))
            .show(ctx, |ui| self.render_central(ui));

        if self.overlay_mounted {
            self.draw_stats(ctx);
        }

        // Update galaxy texture reference after callback has rendered
        if let Some(texture_id) = self.galaxy_texture_id {
            if let Some(wgpu_render_state) = frame.wgpu_render_state() {
                let mut egui_renderer = wgpu_render_state.renderer.write();
                if let Some(galaxy_renderer) =
                    egui_renderer.callback_resources.get::<GalaxyRenderer>()
                {
                    let texture_view = galaxy_renderer.create_view();
                    egui_renderer.update_egui_texture_from_wgpu_texture(
                        &wgpu_render_state.device,
                        &texture_view,
                        egui_wgpu::wgpu::FilterMode::Linear,
                        texture_id,
                    );
                }
            }
        }
    }

    fn on_exit(&mut self) {
        info!("Shutting down");
        self.unmount_scene();
        self.overlay_mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::FALLBACK_TEXT;
    use crate::error::SceneError;

    fn small_app() -> GalaxyApp {
        let mut app = GalaxyApp::with_renderer(None, true);
        app.params.star_count = 100;
        app.params.sparkle_count = 10;
        app.mount_scene();
        app
    }

    fn collect_text(shape: &egui::Shape, out: &mut Vec<String>) {
        match shape {
            egui::Shape::Text(t) => out.push(t.galley.text().to_string()),
            egui::Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_text(s, out)),
            _ => {}
        }
    }

    /// Two passes so areas are past their sizing pass; text of the second
    fn render_text(ctx: &egui::Context, mut run: impl FnMut(&egui::Context)) -> Vec<String> {
        let _ = ctx.run(egui::RawInput::default(), &mut run);
        let output = ctx.run(egui::RawInput::default(), &mut run);
        let mut text = Vec::new();
        for clipped in &output.shapes {
            collect_text(&clipped.shape, &mut text);
        }
        text
    }

    fn central(app: &mut GalaxyApp) -> impl FnMut(&egui::Context) + '_ {
        move |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| app.render_central(ui));
        }
    }

    #[test]
    fn failing_update_unmounts_scene_and_shows_fallback() {
        let mut app = small_app();
        assert!(app.scene.is_some());
        let ctx = egui::Context::default();

        app.params.density = f32::NAN;
        let text = render_text(&ctx, central(&mut app));

        assert!(app.scene.is_none());
        assert!(app.gpu_fields.iter().all(Option::is_none));
        let message = app.boundary.fallback_text().unwrap();
        assert!(message.starts_with(FALLBACK_TEXT));
        assert!(message.contains("density"));
        assert!(text.iter().any(|t| t == &message), "{:?}", text);
    }

    #[test]
    fn injected_error_is_rendered_in_place_of_the_scene() {
        let mut app = small_app();
        let ctx = egui::Context::default();
        let _ = app
            .boundary
            .run(|| Err::<(), _>(SceneError::Update("test-error".to_string())));

        let text = render_text(&ctx, central(&mut app));
        assert!(text
            .iter()
            .any(|t| t.starts_with(FALLBACK_TEXT) && t.contains("test-error")));
        assert!(text.iter().any(|t| t == "Retry"));
    }

    #[test]
    fn overlay_outlives_a_tripped_scene() {
        let mut app = small_app();
        let ctx = egui::Context::default();
        app.params.spiral = f32::INFINITY;
        let _ = render_text(&ctx, central(&mut app));
        assert!(app.scene.is_none());
        assert!(app.overlay_mounted);

        let text = render_text(&ctx, |ctx| app.draw_stats(ctx));
        assert!(text.iter().any(|t| t == "0 stars / 0 nebula / 0 sparkles"), "{:?}", text);
    }

    #[test]
    fn retry_remounts_after_params_are_fixed() {
        let mut app = small_app();
        let epoch = app.mount_epoch;
        app.params.density = f32::NAN;
        app.mount_scene();
        assert!(app.scene.is_none());
        assert!(app.boundary.is_tripped());

        app.params.density = 1.0;
        app.retry();
        assert!(app.scene.is_some());
        assert!(app.boundary.fallback_text().is_none());
        assert!(app.mount_epoch > epoch);
        assert!(app.overlay_mounted);
    }
}
