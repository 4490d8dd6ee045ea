//! Point generation for the three static fields
//!
//! - Spiral disk: the dense core, colored inner → outer by radius
//! - Spherical shell: the sparse nebula, uniform over solid angle
//! - Sparkle box: a loose cube of twinkling points around everything

use rand::Rng;
use std::f32::consts::TAU;

/// Outer radius of the core disk (also the shader's falloff distance)
pub const CORE_RADIUS: f32 = 60.0;
/// Default number of core points
pub const CORE_COUNT: usize = 30_000;
/// Nebula shell inner radius
pub const NEBULA_INNER_RADIUS: f32 = 40.0;
/// Nebula shell thickness
pub const NEBULA_DEPTH: f32 = 20.0;
/// Nebula point count (not tunable)
pub const NEBULA_COUNT: usize = 5000;
/// Edge length of the sparkle cube
pub const SPARKLE_EXTENT: f32 = 120.0;

/// Linear RGB, each channel in [0, 1]
pub type Rgb = [f32; 3];

pub const CORE_INNER_COLOR: Rgb = [1.0, 0.376, 0.188];
pub const CORE_OUTER_COLOR: Rgb = [0.106, 0.224, 0.518];
pub const NEBULA_TINT: Rgb = [0.45, 0.35, 0.95];
pub const SPARKLE_TINT: Rgb = [1.0, 0.95, 0.8];

/// One generated point. Never mutated after generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub position: [f32; 3],
    pub color: Rgb,
}

impl Point {
    /// Distance from the field origin
    pub fn radius(&self) -> f32 {
        let [x, y, z] = self.position;
        (x * x + y * y + z * z).sqrt()
    }
}

/// Flat position/color buffers, 3 floats per point each.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointField {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl PointField {
    pub fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
        }
    }

    fn push(&mut self, point: Point) {
        self.positions.extend_from_slice(&point.position);
        self.colors.extend_from_slice(&point.color);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        let start = index.checked_mul(3)?;
        let range = start..start.checked_add(3)?;
        let p = self.positions.get(range.clone())?;
        let c = self.colors.get(range)?;
        Some(Point {
            position: [p[0], p[1], p[2]],
            color: [c[0], c[1], c[2]],
        })
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.positions
            .chunks_exact(3)
            .zip(self.colors.chunks_exact(3))
            .map(|(p, c)| Point {
                position: [p[0], p[1], p[2]],
                color: [c[0], c[1], c[2]],
            })
    }
}

/// Linear interpolation written so both endpoints are exact.
#[inline]
pub fn lerp_rgb(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let s = 1.0 - t;
    [a[0] * s + b[0] * t, a[1] * s + b[1] * t, a[2] * s + b[2] * t]
}

/// Flat disk with spiral arms, thickest at the center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpiralDisk {
    pub radius: f32,
    pub inner_color: Rgb,
    pub outer_color: Rgb,
}

impl Default for SpiralDisk {
    fn default() -> Self {
        Self {
            radius: CORE_RADIUS,
            inner_color: CORE_INNER_COLOR,
            outer_color: CORE_OUTER_COLOR,
        }
    }
}

impl SpiralDisk {
    /// Color for a point at `radius`: inner at 0, outer at the rim.
    pub fn color_at(&self, radius: f32) -> Rgb {
        lerp_rgb(self.inner_color, self.outer_color, radius / self.radius)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let radius = rng.gen::<f32>() * self.radius;
        let angle = rng.gen::<f32>() * TAU;
        // Radius-dependent twist is what bends the disk into arms
        let spin = radius * (0.3 + rng.gen::<f32>() * 0.2);
        let y = (rng.gen::<f32>() * 8.0 - 4.0) * (1.0 - radius / self.radius);

        let theta = angle + spin;
        Point {
            position: [theta.cos() * radius, y, theta.sin() * radius],
            color: self.color_at(radius),
        }
    }
}

/// Hollow sphere with uniform density over solid angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalShell {
    pub inner_radius: f32,
    pub depth: f32,
    pub tint: Rgb,
}

impl Default for SphericalShell {
    fn default() -> Self {
        Self {
            inner_radius: NEBULA_INNER_RADIUS,
            depth: NEBULA_DEPTH,
            tint: NEBULA_TINT,
        }
    }
}

impl SphericalShell {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let radius = self.inner_radius + rng.gen::<f32>() * self.depth;
        let theta = rng.gen::<f32>() * TAU;
        // acos(2u - 1) rather than uniform phi, otherwise points bunch at the poles
        let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();

        let sin_phi = phi.sin();
        Point {
            position: [
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            ],
            color: self.tint,
        }
    }
}

/// Axis-aligned cube centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparkleBox {
    pub extent: f32,
    pub tint: Rgb,
}

impl Default for SparkleBox {
    fn default() -> Self {
        Self {
            extent: SPARKLE_EXTENT,
            tint: SPARKLE_TINT,
        }
    }
}

impl SparkleBox {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let half = self.extent * 0.5;
        let mut axis = || rng.gen::<f32>() * self.extent - half;
        Point {
            position: [axis(), axis(), axis()],
            color: self.tint,
        }
    }
}

/// Shape policy for a field
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldShape {
    SpiralDisk(SpiralDisk),
    SphericalShell(SphericalShell),
    SparkleBox(SparkleBox),
}

impl FieldShape {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        match self {
            FieldShape::SpiralDisk(s) => s.sample(rng),
            FieldShape::SphericalShell(s) => s.sample(rng),
            FieldShape::SparkleBox(s) => s.sample(rng),
        }
    }

    /// Generate `count` points. `count == 0` gives empty buffers.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> PointField {
        let mut field = PointField::with_capacity(count);
        for _ in 0..count {
            field.push(self.sample(rng));
        }
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f32 = 1e-3;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x9a1a)
    }

    #[test]
    fn spiral_disk_counts_and_radius_bound() {
        let shape = FieldShape::SpiralDisk(SpiralDisk::default());
        let mut rng = rng();
        for n in [0usize, 1, 7, 100, 2500] {
            let field = shape.generate(n, &mut rng);
            assert_eq!(field.len(), n);
            assert_eq!(field.positions().len(), 3 * n);
            assert_eq!(field.colors().len(), 3 * n);
            for p in field.points() {
                assert!(p.radius() <= CORE_RADIUS + EPS, "radius {} > {}", p.radius(), CORE_RADIUS);
            }
        }
    }

    #[test]
    fn zero_points_is_empty_not_error() {
        let field = FieldShape::SphericalShell(SphericalShell::default()).generate(0, &mut rng());
        assert!(field.is_empty());
        assert!(field.positions().is_empty());
        assert!(field.colors().is_empty());
        assert_eq!(field.point(0), None);
    }

    #[test]
    fn core_field_seeded_end_to_end() {
        let mut rng = StdRng::seed_from_u64(42);
        let field = FieldShape::SpiralDisk(SpiralDisk::default()).generate(100, &mut rng);
        assert_eq!(field.positions().len(), 300);
        assert_eq!(field.colors().len(), 300);
        assert!(field.points().all(|p| p.radius() <= CORE_RADIUS + EPS));

        // Same seed, same field
        let again = FieldShape::SpiralDisk(SpiralDisk::default())
            .generate(100, &mut StdRng::seed_from_u64(42));
        assert_eq!(field, again);
    }

    #[test]
    fn disk_flattens_toward_rim() {
        let shape = FieldShape::SpiralDisk(SpiralDisk::default());
        for p in shape.generate(5000, &mut rng()).points() {
            let [x, y, z] = p.position;
            let planar = (x * x + z * z).sqrt();
            let max_y = 4.0 * (1.0 - planar / CORE_RADIUS);
            assert!(y.abs() <= max_y + EPS, "y={} at planar radius {}", y, planar);
        }
    }

    #[test]
    fn color_exact_at_boundaries() {
        let disk = SpiralDisk::default();
        assert_eq!(disk.color_at(0.0), disk.inner_color);
        assert_eq!(disk.color_at(CORE_RADIUS), disk.outer_color);
    }

    #[test]
    fn disk_colors_stay_in_unit_range() {
        let field = FieldShape::SpiralDisk(SpiralDisk::default()).generate(1000, &mut rng());
        assert!(field.colors().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn shell_radius_within_bounds() {
        let field = FieldShape::SphericalShell(SphericalShell::default()).generate(5000, &mut rng());
        assert_eq!(field.len(), 5000);
        for p in field.points() {
            let r = p.radius();
            assert!(
                r >= NEBULA_INNER_RADIUS - EPS && r <= NEBULA_INNER_RADIUS + NEBULA_DEPTH + EPS,
                "shell radius {} out of range",
                r
            );
            assert_eq!(p.color, NEBULA_TINT);
        }
    }

    #[test]
    fn shell_is_uniform_over_solid_angle() {
        // cos(phi) of a uniform sphere sample is uniform on [-1, 1]
        const SAMPLES: usize = 40_000;
        const BINS: usize = 10;
        let field = FieldShape::SphericalShell(SphericalShell::default())
            .generate(SAMPLES, &mut rng());

        let mut histogram = [0usize; BINS];
        for p in field.points() {
            let cos_phi = p.position[1] / p.radius();
            let bin = (((cos_phi + 1.0) * 0.5) * BINS as f32) as usize;
            histogram[bin.min(BINS - 1)] += 1;
        }

        let expected = SAMPLES as f32 / BINS as f32;
        for (i, &count) in histogram.iter().enumerate() {
            let deviation = (count as f32 - expected).abs() / expected;
            assert!(deviation < 0.08, "bin {} has {} samples, expected ~{}", i, count, expected);
        }
        // Poles must not be over-represented relative to the equator
        let poles = histogram[0] + histogram[BINS - 1];
        let equator = histogram[BINS / 2 - 1] + histogram[BINS / 2];
        assert!((poles as f32 / equator as f32 - 1.0).abs() < 0.1);
    }

    #[test]
    fn sparkles_fill_the_cube() {
        let field = FieldShape::SparkleBox(SparkleBox::default()).generate(2000, &mut rng());
        let half = SPARKLE_EXTENT * 0.5;
        assert!(field.positions().iter().all(|v| v.abs() <= half + EPS));
    }

    #[test]
    fn point_lookup_is_bounds_checked() {
        let field = FieldShape::SparkleBox(SparkleBox::default()).generate(4, &mut rng());
        let third = field.point(3).unwrap();
        assert_eq!(&third.position[..], &field.positions()[9..12]);
        assert_eq!(field.point(4), None);
        assert_eq!(field.point(usize::MAX / 3 + 1), None);
        assert_eq!(field.point(usize::MAX), None);
    }

    #[test]
    fn lerp_midpoint() {
        let c = lerp_rgb([0.0, 0.0, 1.0], [1.0, 0.5, 0.0], 0.5);
        assert_eq!(c, [0.5, 0.25, 0.5]);
    }
}
