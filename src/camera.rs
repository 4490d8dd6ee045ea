//! Perspective camera and point light poses

use glam::{Mat4, Vec3, Vec4};

use crate::anim::PoseTarget;
use crate::shader::CameraUniforms;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 40.0, 110.0),
            target: Vec3::ZERO,
            fov_y_radians: 60.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PoseTarget for Camera {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_radians, aspect.max(1e-3), self.near, self.far);
        proj * self.view()
    }

    /// Uniforms for one frame: camera matrices plus the group spin around Y.
    pub fn uniforms(&self, group_rotation: f32, viewport: [f32; 2], pixel_ratio: f32) -> CameraUniforms {
        let aspect = viewport[0] / viewport[1].max(1.0);
        CameraUniforms {
            view_proj: self.view_proj(aspect).to_cols_array_2d(),
            group: Mat4::from_rotation_y(group_rotation).to_cols_array_2d(),
            viewport,
            pixel_ratio,
            _pad: 0.0,
        }
    }
}

/// Projects world points to pixel coordinates, for the CPU renderer.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    view_proj: Mat4,
    group: Mat4,
    size: [f32; 2],
}

impl Projector {
    pub fn new(camera: &Camera, group_rotation: f32, size: [f32; 2]) -> Self {
        let aspect = size[0] / size[1].max(1.0);
        Self {
            view_proj: camera.view_proj(aspect),
            group: Mat4::from_rotation_y(group_rotation),
            size,
        }
    }

    /// Pixel position (origin top-left) and clip-space w, or None if behind
    /// the camera or outside the frustum.
    pub fn project(&self, local: Vec3, in_group: bool) -> Option<([f32; 2], f32)> {
        let world = if in_group {
            self.group * local.extend(1.0)
        } else {
            local.extend(1.0)
        };
        let clip: Vec4 = self.view_proj * world;
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z < 0.0 || ndc.z > 1.0 {
            return None;
        }
        let x = (ndc.x * 0.5 + 0.5) * self.size[0];
        let y = (0.5 - ndc.y * 0.5) * self.size[1];
        Some(([x, y], clip.w))
    }
}

/// Point light moved by the light timeline, drawn as a single glowing point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(-40.0, 20.0, 30.0),
        }
    }
}

impl PoseTarget for Light {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = Camera::default();
        let projector = Projector::new(&camera, 0.0, [800.0, 600.0]);
        let ([x, y], w) = projector.project(Vec3::ZERO, true).unwrap();
        assert!((x - 400.0).abs() < 0.5);
        assert!((y - 300.0).abs() < 0.5);
        assert!((w - camera.position.length()).abs() < 1e-3);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let camera = Camera::default();
        let projector = Projector::new(&camera, 0.0, [800.0, 600.0]);
        assert!(projector.project(Vec3::new(0.0, 80.0, 220.0), false).is_none());
    }

    #[test]
    fn group_rotation_only_applies_in_group() {
        let camera = Camera::default();
        let projector = Projector::new(&camera, std::f32::consts::FRAC_PI_2, [800.0, 600.0]);
        let p = Vec3::new(20.0, 0.0, 0.0);
        let spun = projector.project(p, true).unwrap().0;
        let still = projector.project(p, false).unwrap().0;
        assert!((spun[0] - still[0]).abs() > 1.0);
    }

    #[test]
    fn look_at_sets_target() {
        let mut camera = Camera {
            target: Vec3::ONE,
            ..Default::default()
        };
        camera.set_position(Vec3::new(5.0, 5.0, 5.0));
        camera.look_at(Vec3::ZERO);
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
    }
}
