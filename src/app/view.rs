//! Galaxy view: routes to the GPU callback or the CPU painter

use eframe::egui;
use glam::Vec3;
use std::sync::Arc;

use crate::camera::Projector;
use crate::error::SceneError;
use crate::field::CachedField;
use crate::render::{gpu_points, FieldUpload, FrameUniforms, GalaxyCallback};
use crate::scene::Frame;
use crate::shader::{self, PlainUniforms};
use crate::theme::colors;
use super::GalaxyApp;

/// Upper bound on core points the CPU path draws per frame
const CPU_MAX_POINTS: usize = 6_000;

impl GalaxyApp {
    /// Advance the scene inside the boundary and paint it.
    pub(crate) fn render_galaxy(&mut self, ui: &mut egui::Ui) {
        let params = &self.params;
        let scene = &mut self.scene;
        let frame = self.boundary.run(|| match scene.as_mut() {
            Some(scene) => scene.update(params),
            None => Err(SceneError::Construction("scene is not mounted".to_string())),
        });
        let Some(frame) = frame else {
            self.unmount_scene();
            return;
        };

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, colors::BG_SPACE);

        if self.use_cpu || self.galaxy_texture_id.is_none() {
            self.paint_cpu(&painter, rect, &frame);
        } else {
            self.paint_gpu(&painter, rect, &frame, ui.ctx().pixels_per_point());
        }
    }

    /// GPU path. The callback renders off-screen; the image shows the result.
    fn paint_gpu(&mut self, painter: &egui::Painter, rect: egui::Rect, frame: &Frame, ppp: f32) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        let fields = scene.fields();
        let epoch = self.mount_epoch;
        for (slot, cached) in [&fields.core, &fields.nebula, &fields.sparkles]
            .into_iter()
            .enumerate()
        {
            refresh_upload(&mut self.gpu_fields[slot], cached, epoch);
        }

        if let Some(texture_id) = self.galaxy_texture_id {
            painter.image(
                texture_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        let viewport = [rect.width() * ppp, rect.height() * ppp];
        let uniforms = FrameUniforms {
            camera: frame.camera.uniforms(frame.rotation, viewport, ppp),
            core: frame.core,
            sparkles: frame.sparkles,
            light: frame.light_point,
            light_position: frame.light.position.to_array(),
            bloom_intensity: frame.bloom_intensity,
        };
        let [core, nebula, sparkles] = self.gpu_fields.clone();
        painter.add(egui_wgpu::Callback::new_paint_callback(
            rect,
            GalaxyCallback {
                core,
                nebula,
                sparkles,
                frame: uniforms,
                rect,
            },
        ));
    }

    /// CPU path (--use-cpu, or no wgpu render state). Subsamples the core
    /// field and evaluates the same shading function per point.
    fn paint_cpu(&self, painter: &egui::Painter, rect: egui::Rect, frame: &Frame) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        let fields = scene.fields();
        let projector = Projector::new(&frame.camera, frame.rotation, [rect.width(), rect.height()]);
        let to_screen = |[x, y]: [f32; 2]| rect.min + egui::vec2(x, y);

        let core = fields.core.field();
        let stride = (core.len() / CPU_MAX_POINTS).max(1);
        let gain = (stride as f32).min(4.0);
        for point in core.points().step_by(stride) {
            let local = Vec3::from_array(point.position);
            let Some((pos, w)) = projector.project(local, true) else {
                continue;
            };
            let [r, g, b, _] = shader::core_fragment(local, &frame.core);
            let size = shader::point_size(frame.core.base_size, frame.core.size_attenuation, w);
            painter.circle_filled(to_screen(pos), (size * 0.5).max(0.5), additive([r, g, b], gain));
        }

        let nebula = PlainUniforms::nebula();
        for point in fields.nebula.field().points() {
            let Some((pos, _)) = projector.project(Vec3::from_array(point.position), true) else {
                continue;
            };
            let color = tinted(point.color, nebula.tint, 0.5);
            painter.circle_filled(to_screen(pos), nebula.size * 0.5, additive(color, 1.0));
        }

        let sparkle = frame.sparkles;
        for (i, point) in fields.sparkles.field().points().enumerate() {
            let Some((pos, _)) = projector.project(Vec3::from_array(point.position), false) else {
                continue;
            };
            let brightness = shader::twinkle(i as u32, sparkle.time, sparkle.twinkle_speed);
            let color = tinted(point.color, sparkle.tint, brightness);
            painter.circle_filled(to_screen(pos), sparkle.size * 0.5, additive(color, 1.0));
        }

        if let Some((pos, _)) = projector.project(frame.light.position, false) {
            let light = frame.light_point;
            let color = tinted([1.0, 1.0, 1.0], light.tint, 1.0);
            painter.circle_filled(to_screen(pos), light.size * 0.5, additive(color, 1.0));
        }
    }
}

/// Rebuild the cached upload for a field if its generation moved on.
fn refresh_upload(slot: &mut Option<FieldUpload>, cached: &CachedField, epoch: u64) {
    let key = upload_key(epoch, cached.generation());
    if slot.as_ref().map(|u| u.generation) == Some(key) {
        return;
    }
    *slot = Some(FieldUpload {
        generation: key,
        points: Arc::new(gpu_points(cached.field())),
    });
}

/// Generation numbers restart with every scene mount; the epoch keeps
/// upload keys unique across remounts.
fn upload_key(epoch: u64, generation: u64) -> u64 {
    (epoch << 32) | (generation & 0xFFFF_FFFF)
}

fn tinted(color: [f32; 3], tint: [f32; 4], brightness: f32) -> [f32; 3] {
    [
        color[0] * tint[0] * brightness,
        color[1] * tint[1] * brightness,
        color[2] * tint[2] * brightness,
    ]
}

/// Premultiplied color with zero alpha: egui's blend then adds it onto the
/// background. Negative contributions are dropped.
fn additive(rgb: [f32; 3], gain: f32) -> egui::Color32 {
    let c = |v: f32| ((v * gain).clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_premultiplied(c(rgb[0]), c(rgb[1]), c(rgb[2]), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldShape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn additive_colors_have_zero_alpha_and_clamp() {
        let c = additive([0.5, 2.0, -1.0], 1.0);
        assert_eq!(c.a(), 0);
        assert_eq!(c.r(), 128);
        assert_eq!(c.g(), 255);
        assert_eq!(c.b(), 0);
    }

    #[test]
    fn upload_rebuilt_only_on_new_generation_or_epoch() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cached = CachedField::new("core", FieldShape::SpiralDisk(Default::default()));
        cached.ensure(10, &mut rng);

        let mut slot = None;
        refresh_upload(&mut slot, &cached, 1);
        let first = slot.clone().unwrap();
        assert_eq!(first.points.len(), 10);

        refresh_upload(&mut slot, &cached, 1);
        assert!(Arc::ptr_eq(&first.points, &slot.as_ref().unwrap().points));

        cached.ensure(20, &mut rng);
        refresh_upload(&mut slot, &cached, 1);
        assert_eq!(slot.as_ref().unwrap().points.len(), 20);

        // Same generation number under a new mount still re-uploads
        assert_ne!(upload_key(1, 1), upload_key(2, 1));
    }
}
