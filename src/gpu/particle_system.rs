//! GPU resources for one particle shape.
//!
//! A shape is two vertex buffers (base positions and random scalars), a
//! uniform buffer, and a line-strip pipeline built from the WGSL in
//! [`crate::shader`]. Shapes are immutable in size: changing the particle
//! count means building a new one and releasing the old.

use wgpu::util::DeviceExt;

use crate::error::{ShaderError, ShaderStage};
use crate::particles::{ParticleBuffer, ParticlePosition};
use crate::scene::ShapeRenderer;
use crate::shader::{self, Uniforms};
use crate::viewport::Viewport;

/// Vertex layout for the base positions (location 0).
const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<ParticlePosition>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    }],
};

/// Vertex layout for the random scalars (location 1).
const NUMBER_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<f32>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 0,
        shader_location: 1,
    }],
};

/// Additive blending: overlapping segments brighten.
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// GPU state for drawing one particle line strip.
pub struct ParticleSystem {
    position_buffer: wgpu::Buffer,
    number_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    /// Host copy of the uniform block, written to the GPU on each present.
    uniforms: Uniforms,
    particle_count: u32,
}

impl ParticleSystem {
    /// Upload `particles` and build the pipeline for `surface_format`.
    ///
    /// Each shader stage and the final pipeline are built inside their own
    /// validation error scope, so a failure names the stage that broke.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        particles: &ParticleBuffer,
        viewport: Viewport,
    ) -> Result<Self, ShaderError> {
        let vertex_module = compile_stage(device, ShaderStage::Vertex)?;
        let fragment_module = compile_stage(device, ShaderStage::Fragment)?;

        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Position Buffer"),
            contents: particles.position_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let number_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Number Buffer"),
            contents: particles.number_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms = Uniforms::new([viewport.width as f32, viewport.height as f32]);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(shader::VERTEX_ENTRY),
                buffers: &[POSITION_LAYOUT, NUMBER_LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(shader::FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(ADDITIVE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // No depth test: the strip is drawn in index order.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::new(ShaderStage::Link, err.to_string()));
        }

        log::trace!("Built particle system with {} particles", particles.len());

        Ok(Self {
            position_buffer,
            number_buffer,
            uniform_buffer,
            bind_group,
            pipeline,
            uniforms,
            particle_count: particles.len() as u32,
        })
    }

    pub fn set_view_proj(&mut self, view_proj: glam::Mat4) {
        self.uniforms.view_proj = view_proj.to_cols_array_2d();
    }

    /// Copy the host uniforms to the GPU.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    /// Record the draw into an open render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.set_vertex_buffer(1, self.number_buffer.slice(..));
        pass.draw(0..self.particle_count, 0..1);
    }

    /// Free the buffers now instead of when the last reference drops.
    pub fn release(self) {
        self.position_buffer.destroy();
        self.number_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

impl ShapeRenderer for ParticleSystem {
    fn particle_count(&self) -> u32 {
        self.particle_count
    }

    fn render(&mut self, time: f32, time_scale: f32, angle_number: f32) {
        self.uniforms.elapsed_time = time;
        self.uniforms.time_scale = time_scale;
        self.uniforms.angle_number = angle_number;
    }
}

/// Compile one stage, turning a validation error into a [`ShaderError`].
fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let (source, _) = shader::stage_source(stage)
        .ok_or_else(|| ShaderError::new(stage, "stage has no source"))?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage {
            ShaderStage::Vertex => "Particle Vertex Shader",
            _ => "Particle Fragment Shader",
        }),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::new(stage, err.to_string())),
        None => Ok(module),
    }
}
