//! Procedural point shader: uniform layouts and a CPU reference
//!
//! The WGSL in `render/galaxy.wgsl` and the functions here compute the same
//! thing. The CPU path renders with these when no GPU is available, and the
//! tests pin the math down. Nothing is clamped: a point beyond the disk
//! radius gets a negative density and the additive blend subtracts it.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::TAU;

use crate::field::{lerp_rgb, Rgb, CORE_INNER_COLOR, CORE_OUTER_COLOR, CORE_RADIUS};

/// Base on-screen point size in pixels
pub const POINT_BASE_SIZE: f32 = 0.5;
/// Perspective term: size = base * (1 + k / clip.w)
pub const POINT_SIZE_ATTENUATION: f32 = 100.0;

/// Core field material, matches `CoreMaterial` in galaxy.wgsl (64 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CoreUniforms {
    pub color_inner: [f32; 4],
    pub color_outer: [f32; 4],
    pub time: f32,
    pub density: f32,
    pub spiral: f32,
    pub base_size: f32,
    pub size_attenuation: f32,
    pub _pad: [f32; 3],
}

impl Default for CoreUniforms {
    fn default() -> Self {
        Self {
            color_inner: rgba(CORE_INNER_COLOR),
            color_outer: rgba(CORE_OUTER_COLOR),
            time: 0.0,
            density: 1.0,
            spiral: 3.0,
            base_size: POINT_BASE_SIZE,
            size_attenuation: POINT_SIZE_ATTENUATION,
            _pad: [0.0; 3],
        }
    }
}

impl CoreUniforms {
    pub fn inner(&self) -> Rgb {
        [self.color_inner[0], self.color_inner[1], self.color_inner[2]]
    }

    pub fn outer(&self) -> Rgb {
        [self.color_outer[0], self.color_outer[1], self.color_outer[2]]
    }

    pub fn is_finite(&self) -> bool {
        bytemuck::cast_slice::<_, f32>(std::slice::from_ref(self))
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Material for the flat-tinted fields (nebula, sparkles, light), 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlainUniforms {
    /// rgb multiplier, alpha unused
    pub tint: [f32; 4],
    /// Pixel size
    pub size: f32,
    pub time: f32,
    /// Twinkle cycles per second; 0 disables twinkling
    pub twinkle_speed: f32,
    /// 1.0 if the field spins with the galaxy group
    pub in_group: f32,
}

impl PlainUniforms {
    pub fn nebula() -> Self {
        Self {
            tint: [1.0, 1.0, 1.0, 1.0],
            size: 1.5,
            time: 0.0,
            twinkle_speed: 0.0,
            in_group: 1.0,
        }
    }
}

/// Camera + group transform shared by every pipeline, 144 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub group: [[f32; 4]; 4],
    /// Render target size in physical pixels
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    pub _pad: f32,
}

/// Bloom composite settings, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BloomUniforms {
    /// Luminance where glow starts
    pub threshold: f32,
    /// Width of the soft knee above the threshold
    pub smoothing: f32,
    pub intensity: f32,
    pub _pad0: f32,
    /// 1 / texture size
    pub texel: [f32; 2],
    pub _pad1: [f32; 2],
}

impl BloomUniforms {
    pub fn new(intensity: f32, width: u32, height: u32) -> Self {
        Self {
            threshold: 0.1,
            smoothing: 0.9,
            intensity,
            _pad0: 0.0,
            texel: [1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32],
            _pad1: [0.0; 2],
        }
    }
}

pub fn rgba(c: Rgb) -> [f32; 4] {
    [c[0], c[1], c[2], 1.0]
}

/// Spiral modulation term for a point at `local` (pre-rotation) position
pub fn spiral_term(local: Vec3, spiral: f32, time: f32) -> f32 {
    let dist = local.length();
    (spiral * local.z.atan2(local.x) + 0.1 * dist + 0.2 * time).sin()
}

/// Unclamped density; negative beyond the disk radius
pub fn density(local: Vec3, u: &CoreUniforms) -> f32 {
    let dist = local.length();
    u.density * u.density * (1.0 - dist / CORE_RADIUS) * spiral_term(local, u.spiral, u.time)
}

/// Fragment output for a core point: (color * density, 0.5 * density)
pub fn core_fragment(local: Vec3, u: &CoreUniforms) -> [f32; 4] {
    let dist = local.length();
    let d = density(local, u);
    let color = lerp_rgb(u.inner(), u.outer(), dist / CORE_RADIUS);
    [color[0] * d, color[1] * d, color[2] * d, 0.5 * d]
}

/// On-screen point size for a vertex with clip-space `w`
pub fn point_size(base: f32, attenuation: f32, clip_w: f32) -> f32 {
    base * (1.0 + attenuation / clip_w)
}

/// Twinkle brightness of plain point `instance`, in [0.35, 1]. Matches points.wgsl.
pub fn twinkle(instance: u32, time: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return 1.0;
    }
    let x = (instance as f32 * 12.9898).sin() * 43758.547;
    let hash = x - x.floor();
    let phase = hash * TAU;
    0.35 + 0.65 * (0.5 + 0.5 * (time * speed * TAU + phase).sin())
}
