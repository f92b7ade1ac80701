//! Scene lights.
//!
//! The particle shader is unlit, so these only describe the scene; they are
//! rebuilt with the camera on every reinitialize and sized to the orbit.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Light travels from `position` toward the origin.
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

/// The fixed two-light rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub directional: DirectionalLight,
    pub spot: SpotLight,
}

impl Lights {
    /// White directional light from above and a white spot light on the
    /// `(d, d, d)` diagonal.
    pub fn for_orbit(distance: f32) -> Self {
        Self {
            directional: DirectionalLight {
                color: Vec3::ONE,
                intensity: 1.0,
                position: Vec3::Y,
            },
            spot: SpotLight {
                color: Vec3::ONE,
                intensity: 1.0,
                position: Vec3::splat(distance),
                target: Vec3::ZERO,
            },
        }
    }
}
