//! Static point fields
//!
//! Built once per count on the CPU, uploaded once, never mutated.

mod cache;
mod generator;

pub use cache::{CachedField, FieldSet};
pub use generator::{
    lerp_rgb, FieldShape, Point, PointField, Rgb, SparkleBox, SphericalShell, SpiralDisk,
    CORE_COUNT, CORE_INNER_COLOR, CORE_OUTER_COLOR, CORE_RADIUS, NEBULA_COUNT, NEBULA_DEPTH,
    NEBULA_INNER_RADIUS, NEBULA_TINT, SPARKLE_EXTENT, SPARKLE_TINT,
};
