//! WGSL sources and the uniform block they share.

use bytemuck::{Pod, Zeroable};

use crate::error::ShaderStage;

/// Vertex stage: moves each particle onto the spiral.
pub const VERTEX_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/particle.vert.wgsl")
);

/// Fragment stage: cosine palette keyed on distance from the origin.
pub const FRAGMENT_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/particle.frag.wgsl")
);

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Source and entry point for a compilable stage.
pub fn stage_source(stage: ShaderStage) -> Option<(&'static str, &'static str)> {
    match stage {
        ShaderStage::Vertex => Some((VERTEX_SOURCE, VERTEX_ENTRY)),
        ShaderStage::Fragment => Some((FRAGMENT_SOURCE, FRAGMENT_ENTRY)),
        ShaderStage::Link => None,
    }
}

/// Host copy of the `Uniforms` block in `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Viewport size at creation, in pixels.
    pub resolution: [f32; 2],
    pub elapsed_time: f32,
    pub time_scale: f32,
    pub angle_number: f32,
    pub _padding: [f32; 3],
}

impl Uniforms {
    pub fn new(resolution: [f32; 2]) -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            resolution,
            elapsed_time: 0.0,
            time_scale: 1.0,
            angle_number: 120.0,
            _padding: [0.0; 3],
        }
    }
}
