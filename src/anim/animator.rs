//! Per-frame scene driver
//!
//! Spins the galaxy group, feeds time/density/spiral into the core material
//! and runs the light and camera timelines. Every operation is O(1); no
//! buffer is touched here.

use glam::Vec3;
use std::f32::consts::TAU;
use tracing::{debug, info};

use super::tween::{Ease, Repeat, Timeline, TimelineState};
use crate::error::SceneError;
use crate::params::TuningParameters;
use crate::shader::CoreUniforms;

/// Something a timeline can move: the camera or the light.
pub trait PoseTarget {
    fn set_position(&mut self, position: Vec3);

    /// Re-aim at `target`. Objects without an orientation ignore it.
    fn look_at(&mut self, _target: Vec3) {}
}

/// Keyframes and timings for both timelines.
#[derive(Debug, Clone)]
pub struct AnimatorConfig {
    pub light_from: Vec3,
    pub light_to: Vec3,
    /// Seconds per direction
    pub light_leg_seconds: f32,
    /// Start pose followed by the two leg targets
    pub camera_keyframes: [Vec3; 3],
    pub camera_leg_seconds: f32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            light_from: Vec3::new(-40.0, 20.0, 30.0),
            light_to: Vec3::new(40.0, 25.0, -30.0),
            light_leg_seconds: 8.0,
            camera_keyframes: [
                Vec3::new(0.0, 40.0, 110.0),
                Vec3::new(90.0, 25.0, 60.0),
                Vec3::new(-70.0, 55.0, 80.0),
            ],
            camera_leg_seconds: 20.0,
        }
    }
}

pub struct SceneAnimator {
    rotation: f32,
    frames: u64,
    uniforms: CoreUniforms,
    light: Timeline,
    camera: Timeline,
    torn_down: bool,
}

impl SceneAnimator {
    /// Build both timelines and start them.
    pub fn mount(config: &AnimatorConfig) -> Result<Self, SceneError> {
        let mut light = Timeline::new(
            vec![config.light_from, config.light_to],
            config.light_leg_seconds,
            Ease::InOutSine,
            Repeat::Yoyo,
        )?;
        let mut camera = Timeline::new(
            config.camera_keyframes.to_vec(),
            config.camera_leg_seconds,
            Ease::InOutQuad,
            Repeat::Restart,
        )?;
        light.start();
        camera.start();
        info!(
            light_leg_s = config.light_leg_seconds,
            camera_leg_s = config.camera_leg_seconds,
            "Scene animator mounted"
        );

        Ok(Self {
            rotation: 0.0,
            frames: 0,
            uniforms: CoreUniforms::default(),
            light,
            camera,
            torn_down: false,
        })
    }

    /// One frame. `elapsed` is wall-clock seconds since mount, `delta` the
    /// time since the previous frame. No-op after [`teardown`](Self::teardown).
    pub fn tick(
        &mut self,
        params: &TuningParameters,
        elapsed: f64,
        delta: f64,
        camera: &mut impl PoseTarget,
        light: &mut impl PoseTarget,
    ) -> Result<(), SceneError> {
        if self.torn_down {
            return Ok(());
        }
        self.frames += 1;

        // Per tick, not per second: speed follows the frame rate
        self.rotation = (self.rotation + params.rotate_speed).rem_euclid(TAU);

        self.uniforms.time = elapsed as f32;
        self.uniforms.density = params.density;
        self.uniforms.spiral = params.spiral;
        if !self.uniforms.is_finite() || !self.rotation.is_finite() {
            return Err(SceneError::Update(format!(
                "non-finite core uniforms at frame {} (time={}, density={}, spiral={})",
                self.frames, self.uniforms.time, self.uniforms.density, self.uniforms.spiral
            )));
        }

        let dt = delta as f32;
        if let Some(position) = self.light.advance(dt) {
            light.set_position(position);
        }
        if let Some(position) = self.camera.advance(dt) {
            camera.set_position(position);
            camera.look_at(Vec3::ZERO);
        }
        Ok(())
    }

    /// Cancel both timelines. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.light.cancel();
        self.camera.cancel();
        self.torn_down = true;
        debug!(frames = self.frames, "Scene animator torn down");
    }

    pub fn is_running(&self) -> bool {
        !self.torn_down
    }

    /// Group rotation around Y, radians in [0, 2π)
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn uniforms(&self) -> &CoreUniforms {
        &self.uniforms
    }

    pub fn timeline_states(&self) -> (TimelineState, TimelineState) {
        (self.light.state(), self.camera.state())
    }
}

impl Drop for SceneAnimator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts writes so tests can see exactly when poses move.
    #[derive(Default)]
    struct SpyTarget {
        positions: usize,
        aims: usize,
        last: Option<Vec3>,
        aimed_at: Option<Vec3>,
    }

    impl PoseTarget for SpyTarget {
        fn set_position(&mut self, position: Vec3) {
            self.positions += 1;
            self.last = Some(position);
        }

        fn look_at(&mut self, target: Vec3) {
            self.aims += 1;
            self.aimed_at = Some(target);
        }
    }

    fn mounted() -> SceneAnimator {
        SceneAnimator::mount(&AnimatorConfig::default()).unwrap()
    }

    #[test]
    fn both_timelines_start_running() {
        let animator = mounted();
        assert_eq!(
            animator.timeline_states(),
            (TimelineState::Running, TimelineState::Running)
        );
        assert!(animator.is_running());
    }

    #[test]
    fn tick_writes_poses_and_aims_camera_at_origin() {
        let mut animator = mounted();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters::default();

        for frame in 1..=10 {
            animator
                .tick(&params, frame as f64 / 60.0, 1.0 / 60.0, &mut camera, &mut light)
                .unwrap();
        }
        assert_eq!(camera.positions, 10);
        assert_eq!(camera.aims, 10);
        assert_eq!(camera.aimed_at, Some(Vec3::ZERO));
        assert_eq!(light.positions, 10);
        assert_eq!(light.aims, 0);
    }

    #[test]
    fn no_pose_write_after_teardown() {
        let mut animator = mounted();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters::default();

        animator.tick(&params, 0.1, 0.1, &mut camera, &mut light).unwrap();
        let (cam_before, light_before) = (camera.positions, light.positions);
        assert_eq!((cam_before, light_before), (1, 1));

        animator.teardown();
        animator.teardown();
        assert_eq!(
            animator.timeline_states(),
            (TimelineState::Cancelled, TimelineState::Cancelled)
        );

        let rotation = animator.rotation();
        for frame in 0..120 {
            animator
                .tick(&params, 1.0 + frame as f64, 0.016, &mut camera, &mut light)
                .unwrap();
        }
        assert_eq!(camera.positions, cam_before);
        assert_eq!(camera.aims, 1);
        assert_eq!(light.positions, light_before);
        assert_eq!(animator.rotation(), rotation);
    }

    #[test]
    fn uniforms_follow_params_and_wall_clock() {
        let mut animator = mounted();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters {
            density: 2.5,
            spiral: 7.0,
            ..Default::default()
        };
        animator.tick(&params, 3.5, 0.016, &mut camera, &mut light).unwrap();
        let u = animator.uniforms();
        assert_eq!(u.time, 3.5);
        assert_eq!(u.density, 2.5);
        assert_eq!(u.spiral, 7.0);
    }

    #[test]
    fn rotation_advances_per_tick_not_per_second() {
        let mut animator = mounted();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters {
            rotate_speed: 0.01,
            ..Default::default()
        };
        // Same number of ticks, very different deltas: same rotation
        animator.tick(&params, 0.0, 0.001, &mut camera, &mut light).unwrap();
        animator.tick(&params, 0.0, 0.2, &mut camera, &mut light).unwrap();
        assert!((animator.rotation() - 0.02).abs() < 1e-6);
    }

    #[test]
    fn non_finite_params_are_an_update_error() {
        let mut animator = mounted();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters {
            spiral: f32::NAN,
            ..Default::default()
        };
        let err = animator
            .tick(&params, 0.0, 0.016, &mut camera, &mut light)
            .unwrap_err();
        assert!(matches!(err, SceneError::Update(_)));
        assert_eq!(camera.positions, 0);
    }

    #[test]
    fn light_reaches_far_keyframe_after_one_leg() {
        let config = AnimatorConfig::default();
        let mut animator = SceneAnimator::mount(&config).unwrap();
        let (mut camera, mut light) = (SpyTarget::default(), SpyTarget::default());
        let params = TuningParameters::default();
        // 8 s in 0.25 s steps
        for i in 1..=32 {
            animator.tick(&params, i as f64 * 0.25, 0.25, &mut camera, &mut light).unwrap();
        }
        let last = light.last.unwrap();
        assert!((last - config.light_to).length() < 1e-3, "light at {:?}", last);
    }
}
