//! Particle buffer contents and the CPU mirror of the shader math.
//!
//! Every particle starts on the z axis at `(0, 0, index)`; the vertex stage
//! turns that index into a point on a winding spiral. The functions here
//! compute exactly what `shaders/particle.vert.wgsl` and
//! `shaders/particle.frag.wgsl` compute, so the formulas can be checked
//! without a GPU.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

/// Degrees to radians.
pub const RADIAN: f32 = PI / 180.0;
/// Spiral radius per unit of particle index, in radians.
pub const RADIUS_SCALE: f32 = 0.05;
/// Height of the z wave.
pub const WAVE_AMPLITUDE: f32 = 3.0;
/// Palette drift per second of elapsed time.
pub const PALETTE_SPEED: f32 = 0.5;

/// Base position of one particle, laid out for a `Float32x3` vertex attribute.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticlePosition {
    pub position: [f32; 3],
}

/// CPU-side particle data for one shape, before upload.
///
/// Positions and per-particle random scalars are kept in two parallel
/// arrays that become two vertex buffers.
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    positions: Vec<ParticlePosition>,
    numbers: Vec<f32>,
}

impl ParticleBuffer {
    /// Lay out `count` particles along the z axis with fresh random scalars.
    pub fn new<R: Rng>(count: u32, rng: &mut R) -> Self {
        let positions = (0..count)
            .map(|i| ParticlePosition {
                position: [0.0, 0.0, i as f32],
            })
            .collect();

        let numbers = (0..count).map(|_| rng.gen_range(-1.0f32..1.0)).collect();

        Self { positions, numbers }
    }

    /// Same as [`new`](Self::new) using the thread-local RNG.
    pub fn random(count: u32) -> Self {
        Self::new(count, &mut rand::thread_rng())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[ParticlePosition] {
        &self.positions
    }

    /// Per-particle random scalars in `[-1, 1)`.
    ///
    /// Uploaded alongside the positions; the transform does not read them.
    pub fn numbers(&self) -> &[f32] {
        &self.numbers
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn number_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.numbers)
    }
}

/// Per-frame values the transform depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub elapsed_time: f32,
    pub time_scale: f32,
    pub angle_number: f32,
}

/// Move a base position onto the spiral.
///
/// ```text
/// r     = z * RADIAN * 0.05
/// angle = RADIAN * z * |angle_number - elapsed_time * time_scale|
/// x'    = cos(angle) * r
/// y'    = sin(angle) * r
/// z'    = sin(length(x', y') - elapsed_time) * 3.0
/// ```
///
/// CPU copy of `vs_main` in `shaders/particle.vert.wgsl`. The per-particle
/// random scalar plays no part in either.
pub fn transform(base: Vec3, params: &ShapeParams) -> Vec3 {
    let z = base.z;
    let r = RADIAN * z * RADIUS_SCALE;
    let angle = RADIAN * z * (params.angle_number - params.elapsed_time * params.time_scale).abs();

    let x = angle.cos() * r;
    let y = angle.sin() * r;
    let len_xy = (x * x + y * y).sqrt();

    Vec3::new(x, y, (len_xy - params.elapsed_time).sin() * WAVE_AMPLITUDE)
}

/// Cosine palette `a + b * cos(2π(c*t + d))`.
///
/// See <https://iquilezles.org/articles/palettes/>.
pub fn cosine_palette(t: f32, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec3 {
    let phase = (c * t + d) * TAU;
    a + b * Vec3::new(phase.x.cos(), phase.y.cos(), phase.z.cos())
}

/// Colour of a fragment at transformed position `pos`.
pub fn palette(pos: Vec3, elapsed_time: f32) -> Vec3 {
    let t = (pos.length() * 2.0 - elapsed_time * PALETTE_SPEED).abs();
    cosine_palette(
        t,
        Vec3::splat(0.5),
        Vec3::splat(0.5),
        Vec3::ONE,
        Vec3::new(0.0, 0.10, 0.20),
    )
}
