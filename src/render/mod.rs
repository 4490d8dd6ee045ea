//! GPU rendering of the galaxy through egui-wgpu paint callbacks

mod renderer;

pub use renderer::{gpu_points, FieldUpload, FrameUniforms, GalaxyCallback, GalaxyRenderer, GpuPoint};
