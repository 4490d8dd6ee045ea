//! GPU galaxy renderer.
//!
//! Draws the point fields additively into an off-screen HDR texture, then a
//! bloom composite resolves it into a texture egui shows via painter.image().

use bytemuck::{Pod, Zeroable};
use egui_wgpu::wgpu::{self, util::DeviceExt};
use std::sync::Arc;
use tracing::debug;

use crate::field::{Point, PointField};
use crate::shader::{BloomUniforms, CameraUniforms, CoreUniforms, PlainUniforms};

const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// src + dst on every channel; no depth test, order independent.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// GPU-compatible point (24 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuPoint {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl From<Point> for GpuPoint {
    fn from(p: Point) -> Self {
        Self {
            position: p.position,
            color: p.color,
        }
    }
}

/// Interleave a field's parallel buffers for upload
pub fn gpu_points(field: &PointField) -> Vec<GpuPoint> {
    field.points().map(GpuPoint::from).collect()
}

/// A regenerated field on its way to the GPU
#[derive(Clone)]
pub struct FieldUpload {
    pub generation: u64,
    pub points: Arc<Vec<GpuPoint>>,
}

/// Per-frame uniforms handed from the app to the renderer
#[derive(Clone, Copy, Debug)]
pub struct FrameUniforms {
    pub camera: CameraUniforms,
    pub core: CoreUniforms,
    pub sparkles: PlainUniforms,
    pub light: PlainUniforms,
    pub light_position: [f32; 3],
    pub bloom_intensity: f32,
}

/// Vertex buffer for one field. Replaced wholesale when the generation moves.
struct FieldBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    count: u32,
    generation: u64,
}

impl FieldBuffer {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            buffer: None,
            count: 0,
            generation: 0,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, upload: &FieldUpload) {
        if upload.generation == self.generation {
            return;
        }
        self.generation = upload.generation;
        self.count = upload.points.len() as u32;
        self.buffer = if upload.points.is_empty() {
            None
        } else {
            Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(self.label),
                contents: bytemuck::cast_slice(&upload.points),
                usage: wgpu::BufferUsages::VERTEX,
            }))
        };
        debug!(field = self.label, count = self.count, generation = self.generation, "Field uploaded");
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if let Some(buffer) = &self.buffer {
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..6, 0..self.count);
        }
    }
}

struct Material {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Material {
    fn new<T: Pod>(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        uniforms: &T,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(uniforms),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn point_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuPoint>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3, // position
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32x3, // color
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: SCENE_FORMAT,
                blend: Some(ADDITIVE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // 6 vertices per instance; PointList is 1px on many GPUs
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub struct GalaxyRenderer {
    core_pipeline: wgpu::RenderPipeline,
    points_pipeline: wgpu::RenderPipeline,
    bloom_pipeline: wgpu::RenderPipeline,

    camera: Material,
    core_material: Material,
    nebula_material: Material,
    sparkle_material: Material,
    light_material: Material,

    core: FieldBuffer,
    nebula: FieldBuffer,
    sparkles: FieldBuffer,
    light_buffer: wgpu::Buffer,

    bloom_layout: wgpu::BindGroupLayout,
    bloom_buffer: wgpu::Buffer,
    bloom_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    // Render targets
    scene_view: wgpu::TextureView,
    output: wgpu::Texture,
    output_view: wgpu::TextureView,
    target_format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl GalaxyRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let galaxy_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("galaxy_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("galaxy.wgsl").into()),
        });
        let points_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("points.wgsl").into()),
        });
        let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("bloom.wgsl").into()),
        });

        let camera_layout = uniform_layout(device, "galaxy_camera_layout");
        let material_layout = uniform_layout(device, "galaxy_material_layout");
        let point_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("galaxy_point_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let core_pipeline = point_pipeline(device, &point_layout, &galaxy_shader, "galaxy_core_pipeline");
        let points_pipeline =
            point_pipeline(device, &point_layout, &points_shader, "galaxy_points_pipeline");

        let bloom_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("galaxy_bloom_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bloom_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("galaxy_bloom_pipeline_layout"),
            bind_group_layouts: &[&bloom_layout],
            push_constant_ranges: &[],
        });
        let bloom_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("galaxy_bloom_pipeline"),
            layout: Some(&bloom_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &bloom_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &bloom_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let camera = Material::new(
            device,
            &camera_layout,
            "galaxy_camera",
            &CameraUniforms::zeroed(),
        );
        let core_material =
            Material::new(device, &material_layout, "galaxy_core_material", &CoreUniforms::default());
        // The nebula never changes after creation
        let nebula_material =
            Material::new(device, &material_layout, "galaxy_nebula_material", &PlainUniforms::nebula());
        let sparkle_material =
            Material::new(device, &material_layout, "galaxy_sparkle_material", &PlainUniforms::zeroed());
        let light_material =
            Material::new(device, &material_layout, "galaxy_light_material", &PlainUniforms::zeroed());

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("galaxy_light_point"),
            size: std::mem::size_of::<GpuPoint>() as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("galaxy_bloom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bloom_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("galaxy_bloom_uniforms"),
            contents: bytemuck::bytes_of(&BloomUniforms::new(1.0, 1, 1)),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });

        let (_, scene_view) = Self::create_texture(device, SCENE_FORMAT, 1, 1, "galaxy_scene_texture");
        let (output, output_view) =
            Self::create_texture(device, target_format, 1, 1, "galaxy_output_texture");
        let bloom_bind_group =
            Self::create_bloom_bind_group(device, &bloom_layout, &scene_view, &sampler, &bloom_buffer);

        Self {
            core_pipeline,
            points_pipeline,
            bloom_pipeline,
            camera,
            core_material,
            nebula_material,
            sparkle_material,
            light_material,
            core: FieldBuffer::new("galaxy_core_points"),
            nebula: FieldBuffer::new("galaxy_nebula_points"),
            sparkles: FieldBuffer::new("galaxy_sparkle_points"),
            light_buffer,
            bloom_layout,
            bloom_buffer,
            bloom_bind_group,
            sampler,
            scene_view,
            output,
            output_view,
            target_format,
            width: 1,
            height: 1,
        }
    }

    fn create_texture(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        label: &str,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_bloom_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        scene_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        uniforms: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("galaxy_bloom_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let Some((width, height)) = resized(self.width, self.height, width, height) else {
            return;
        };
        self.width = width;
        self.height = height;
        let (_, scene_view) =
            Self::create_texture(device, SCENE_FORMAT, self.width, self.height, "galaxy_scene_texture");
        let (output, output_view) = Self::create_texture(
            device,
            self.target_format,
            self.width,
            self.height,
            "galaxy_output_texture",
        );
        self.bloom_bind_group = Self::create_bloom_bind_group(
            device,
            &self.bloom_layout,
            &scene_view,
            &self.sampler,
            &self.bloom_buffer,
        );
        self.scene_view = scene_view;
        self.output = output;
        self.output_view = output_view;
        debug!(width = self.width, height = self.height, "Galaxy render targets resized");
    }

    /// View of the composited output, for egui texture registration
    pub fn create_view(&self) -> wgpu::TextureView {
        self.output.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Upload changed fields and uniforms, then render both passes.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dimensions: [u32; 2],
        callback: &GalaxyCallback,
    ) {
        self.resize(device, dimensions[0], dimensions[1]);

        for (buffer, upload) in [
            (&mut self.core, &callback.core),
            (&mut self.nebula, &callback.nebula),
            (&mut self.sparkles, &callback.sparkles),
        ] {
            if let Some(upload) = upload {
                buffer.upload(device, upload);
            }
        }

        let frame = &callback.frame;
        queue.write_buffer(&self.camera.buffer, 0, bytemuck::bytes_of(&frame.camera));
        queue.write_buffer(&self.core_material.buffer, 0, bytemuck::bytes_of(&frame.core));
        queue.write_buffer(&self.sparkle_material.buffer, 0, bytemuck::bytes_of(&frame.sparkles));
        queue.write_buffer(&self.light_material.buffer, 0, bytemuck::bytes_of(&frame.light));
        let light_point = GpuPoint {
            position: frame.light_position,
            color: [1.0, 1.0, 1.0],
        };
        queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&light_point));
        let bloom = BloomUniforms::new(frame.bloom_intensity, self.width, self.height);
        queue.write_buffer(&self.bloom_buffer, 0, bytemuck::bytes_of(&bloom));

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("galaxy_scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.camera.bind_group, &[]);

            pass.set_pipeline(&self.core_pipeline);
            pass.set_bind_group(1, &self.core_material.bind_group, &[]);
            self.core.draw(&mut pass);

            pass.set_pipeline(&self.points_pipeline);
            pass.set_bind_group(1, &self.nebula_material.bind_group, &[]);
            self.nebula.draw(&mut pass);

            pass.set_bind_group(1, &self.sparkle_material.bind_group, &[]);
            self.sparkles.draw(&mut pass);

            pass.set_bind_group(1, &self.light_material.bind_group, &[]);
            pass.set_vertex_buffer(0, self.light_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("galaxy_bloom_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.bloom_pipeline);
            pass.set_bind_group(0, &self.bloom_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }
}

/// Callback for egui integration. Renders to the off-screen texture in prepare()
pub struct GalaxyCallback {
    pub core: Option<FieldUpload>,
    pub nebula: Option<FieldUpload>,
    pub sparkles: Option<FieldUpload>,
    pub frame: FrameUniforms,
    pub rect: egui::Rect,
}

impl egui_wgpu::CallbackTrait for GalaxyCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(renderer): Option<&mut GalaxyRenderer> = callback_resources.get_mut() else {
            return vec![];
        };

        let ppp = screen_descriptor.pixels_per_point;
        renderer.prepare(
            device,
            queue,
            encoder,
            [
                (self.rect.width() * ppp).round() as u32,
                (self.rect.height() * ppp).round() as u32,
            ],
            self,
        );
        vec![]
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        _render_pass: &mut wgpu::RenderPass<'static>,
        _callback_resources: &egui_wgpu::CallbackResources,
    ) {
        // Rendering done in prepare() to own texture, not to egui's render pass
    }
}

/// New target size, if it differs from the current one. Textures are at least 1x1.
fn resized(current_w: u32, current_h: u32, width: u32, height: u32) -> Option<(u32, u32)> {
    let (width, height) = (width.max(1), height.max(1));
    (width != current_w || height != current_h).then_some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldShape;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn gpu_point_matches_vertex_layout() {
        assert_eq!(std::mem::size_of::<GpuPoint>(), 24);
    }

    #[test]
    fn gpu_points_interleave_positions_and_colors() {
        let mut rng = StdRng::seed_from_u64(11);
        let field = FieldShape::SpiralDisk(Default::default()).generate(50, &mut rng);
        let points = gpu_points(&field);
        assert_eq!(points.len(), 50);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.position[..], field.positions()[i * 3..i * 3 + 3]);
            assert_eq!(p.color[..], field.colors()[i * 3..i * 3 + 3]);
        }
    }

    #[test]
    fn collapsed_rect_resizes_once() {
        assert_eq!(resized(1, 1, 800, 600), Some((800, 600)));
        assert_eq!(resized(800, 600, 0, 0), Some((1, 1)));
        assert_eq!(resized(1, 1, 0, 0), None);
        assert_eq!(resized(1, 1, 0, 1), None);
        assert_eq!(resized(800, 600, 800, 600), None);
    }

    #[test]
    fn empty_field_uploads_nothing() {
        assert!(gpu_points(&PointField::default()).is_empty());
    }
}
