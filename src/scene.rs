//! The galaxy scene: fields, animator, camera and light in one place
//!
//! Platform-agnostic. The app drives [`Scene::update`] once per frame inside
//! the fault boundary and hands the resulting [`Frame`] to a renderer.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::anim::{AnimatorConfig, SceneAnimator};
use crate::camera::{Camera, Light};
use crate::error::SceneError;
use crate::field::FieldSet;
use crate::params::TuningParameters;
use crate::shader::{CoreUniforms, PlainUniforms};
use crate::time::FrameClock;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub elapsed: f32,
    pub rotation: f32,
    pub camera: Camera,
    pub light: Light,
    pub core: CoreUniforms,
    pub sparkles: PlainUniforms,
    pub light_point: PlainUniforms,
    pub bloom_intensity: f32,
}

pub struct Scene {
    fields: FieldSet,
    animator: SceneAnimator,
    camera: Camera,
    light: Light,
    clock: FrameClock,
    rng: StdRng,
}

impl Scene {
    /// Validate the knobs, mount the animator, generate the fields.
    pub fn build(params: &TuningParameters) -> Result<Self, SceneError> {
        Self::build_with_rng(params, StdRng::from_entropy(), FrameClock::new())
    }

    /// Deterministic variant for tests and reproducible captures.
    pub fn with_seed(params: &TuningParameters, seed: u64) -> Result<Self, SceneError> {
        Self::build_with_rng(params, StdRng::seed_from_u64(seed), FrameClock::starting_at(0.0))
    }

    fn build_with_rng(
        params: &TuningParameters,
        mut rng: StdRng,
        clock: FrameClock,
    ) -> Result<Self, SceneError> {
        params.validate()?;
        let config = AnimatorConfig::default();
        let animator = SceneAnimator::mount(&config)?;
        let mut fields = FieldSet::new();
        fields.sync(params, &mut rng);

        let camera = Camera {
            position: config.camera_keyframes[0],
            ..Default::default()
        };
        let light = Light {
            position: config.light_from,
        };
        info!(
            core = fields.core.field().len(),
            nebula = fields.nebula.field().len(),
            sparkles = fields.sparkles.field().len(),
            "Scene built"
        );

        Ok(Self {
            fields,
            animator,
            camera,
            light,
            clock,
            rng,
        })
    }

    /// Advance one frame using the wall clock.
    pub fn update(&mut self, params: &TuningParameters) -> Result<Frame, SceneError> {
        let (elapsed, delta) = self.clock.tick();
        self.update_at(params, elapsed, delta)
    }

    /// Advance one frame with explicit timing.
    pub fn update_at(
        &mut self,
        params: &TuningParameters,
        elapsed: f64,
        delta: f64,
    ) -> Result<Frame, SceneError> {
        params.validate()?;
        self.fields.sync(params, &mut self.rng);
        self.animator
            .tick(params, elapsed, delta, &mut self.camera, &mut self.light)?;

        let elapsed = elapsed as f32;
        Ok(Frame {
            elapsed,
            rotation: self.animator.rotation(),
            camera: self.camera,
            light: self.light,
            core: *self.animator.uniforms(),
            sparkles: sparkle_uniforms(params, elapsed),
            light_point: light_uniforms(params),
            bloom_intensity: params.bloom_intensity,
        })
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_running(&self) -> bool {
        self.animator.is_running()
    }

    /// Stop the timelines. Called on app exit and when the boundary trips.
    pub fn teardown(&mut self) {
        self.animator.teardown();
    }
}

fn sparkle_uniforms(params: &TuningParameters, time: f32) -> PlainUniforms {
    PlainUniforms {
        tint: [1.0, 1.0, 1.0, 1.0],
        size: params.sparkle_size,
        time,
        twinkle_speed: params.sparkle_speed,
        in_group: 0.0,
    }
}

fn light_uniforms(params: &TuningParameters) -> PlainUniforms {
    let [r, g, b] = params.light_color;
    let i = params.light_intensity;
    PlainUniforms {
        tint: [r * i, g * i, b * i, 1.0],
        size: 6.0 + 4.0 * i,
        time: 0.0,
        twinkle_speed: 0.0,
        in_group: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::NEBULA_COUNT;
    use glam::Vec3;

    fn small_params() -> TuningParameters {
        TuningParameters {
            star_count: 100,
            sparkle_count: 10,
            ..Default::default()
        }
    }

    #[test]
    fn build_generates_fields_once() {
        let params = small_params();
        let mut scene = Scene::with_seed(&params, 3).unwrap();
        assert_eq!(scene.fields().core.field().positions().len(), 300);
        assert_eq!(scene.fields().nebula.field().len(), NEBULA_COUNT);

        for i in 0..5 {
            scene.update_at(&params, i as f64 * 0.016, 0.016).unwrap();
        }
        assert_eq!(scene.fields().core.generation(), 1);
        assert_eq!(scene.fields().nebula.generation(), 1);
    }

    #[test]
    fn star_count_change_regenerates_core_only() {
        let mut params = small_params();
        let mut scene = Scene::with_seed(&params, 3).unwrap();
        params.star_count = 200;
        scene.update_at(&params, 0.016, 0.016).unwrap();
        assert_eq!(scene.fields().core.field().len(), 200);
        assert_eq!(scene.fields().core.generation(), 2);
        assert_eq!(scene.fields().nebula.generation(), 1);
    }

    #[test]
    fn frame_carries_uniforms_and_moving_camera() {
        let params = small_params();
        let mut scene = Scene::with_seed(&params, 3).unwrap();
        let start = scene.camera().position;
        let frame = scene.update_at(&params, 2.0, 2.0 * 0.125).unwrap();
        assert_eq!(frame.core.time, 2.0);
        assert_eq!(frame.core.density, params.density);
        assert_ne!(frame.camera.position, start);
        assert_eq!(frame.camera.target, Vec3::ZERO);
        assert_eq!(frame.sparkles.twinkle_speed, params.sparkle_speed);
    }

    #[test]
    fn invalid_params_fail_construction() {
        let params = TuningParameters {
            density: f32::INFINITY,
            ..small_params()
        };
        assert!(matches!(
            Scene::with_seed(&params, 1),
            Err(SceneError::InvalidParameter { name: "density", .. })
        ));
    }

    #[test]
    fn teardown_freezes_camera() {
        let params = small_params();
        let mut scene = Scene::with_seed(&params, 3).unwrap();
        scene.update_at(&params, 0.1, 0.1).unwrap();
        scene.teardown();
        assert!(!scene.is_running());
        let frozen = scene.camera().position;
        scene.update_at(&params, 1.0, 0.2).unwrap();
        assert_eq!(scene.camera().position, frozen);
    }

    #[test]
    fn long_stall_keeps_timelines_bounded() {
        let params = small_params();
        let mut scene = Scene::with_seed(&params, 3).unwrap();
        let frame = scene.update_at(&params, 1e9, 1e9).unwrap();
        assert!(frame.camera.position.is_finite());
        assert!(frame.light.position.is_finite());
        scene.update_at(&params, 1e9, f64::INFINITY).unwrap();
        assert!(scene.is_running());
    }

    #[test]
    fn light_tint_scales_with_intensity() {
        let params = TuningParameters {
            light_color: [1.0, 0.5, 0.0],
            light_intensity: 2.0,
            ..Default::default()
        };
        let u = light_uniforms(&params);
        assert_eq!(u.tint, [2.0, 1.0, 0.0, 1.0]);
    }
}
