//! Generated fields cached by point count
//!
//! Generation is O(N) trig + random draws, so a field is rebuilt only when
//! its requested count changes. Each rebuild bumps a generation number the
//! renderer compares against to decide whether to re-upload.

use rand::Rng;
use tracing::info;

use super::generator::{
    FieldShape, PointField, SparkleBox, SphericalShell, SpiralDisk, NEBULA_COUNT,
};
use crate::params::TuningParameters;
use crate::time::now_seconds;

/// One field plus the count it was generated for.
#[derive(Debug)]
pub struct CachedField {
    name: &'static str,
    shape: FieldShape,
    count: Option<usize>,
    field: PointField,
    generation: u64,
}

impl CachedField {
    pub fn new(name: &'static str, shape: FieldShape) -> Self {
        Self {
            name,
            shape,
            count: None,
            field: PointField::default(),
            generation: 0,
        }
    }

    /// Regenerate if `count` differs from the cached one. Returns true on rebuild.
    pub fn ensure<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> bool {
        if self.count == Some(count) {
            return false;
        }
        let started = now_seconds();
        self.field = self.shape.generate(count, rng);
        self.count = Some(count);
        self.generation += 1;
        info!(
            field = self.name,
            count,
            generation = self.generation,
            elapsed_ms = format!("{:.1}", (now_seconds() - started) * 1000.0),
            "Point field generated"
        );
        true
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    /// 0 until the first generation
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The three fields of the scene.
#[derive(Debug)]
pub struct FieldSet {
    pub core: CachedField,
    pub nebula: CachedField,
    pub sparkles: CachedField,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldSet {
    pub fn new() -> Self {
        Self {
            core: CachedField::new("core", FieldShape::SpiralDisk(SpiralDisk::default())),
            nebula: CachedField::new(
                "nebula",
                FieldShape::SphericalShell(SphericalShell::default()),
            ),
            sparkles: CachedField::new("sparkles", FieldShape::SparkleBox(SparkleBox::default())),
        }
    }

    /// Bring every field in line with the current knobs.
    /// Returns true if anything was regenerated.
    pub fn sync<R: Rng + ?Sized>(&mut self, params: &TuningParameters, rng: &mut R) -> bool {
        let core = self.core.ensure(params.star_count as usize, rng);
        let nebula = self.nebula.ensure(NEBULA_COUNT, rng);
        let sparkles = self.sparkles.ensure(params.sparkle_count as usize, rng);
        core || nebula || sparkles
    }
}
