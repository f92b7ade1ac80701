//! Perspective camera that circles the shape.
//!
//! The orbit radius is derived from the viewport height so the shape keeps
//! the same framing whatever the window size.

use glam::{Mat4, Vec3};

use crate::viewport::Viewport;

/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 70.0;
/// Near clip plane.
pub const NEAR_PLANE: f32 = 0.01;
/// Far plane as a multiple of the orbit distance.
pub const FAR_FACTOR: f32 = 5.0;
/// Starting position along +z, as a multiple of the orbit distance.
pub const INITIAL_DISTANCE_FACTOR: f32 = 0.008;
/// Orbit angular speed in radians per second.
pub const ORBIT_SPEED: f32 = 0.1;

/// Distance at which a `viewport_height` tall plane exactly fills the field of view.
pub fn orbit_distance(viewport_height: u32) -> f32 {
    let half_fov = (FOV_DEGREES / 2.0).to_radians();
    (viewport_height as f32 / 2.0) / half_fov.tan()
}

/// Camera position on the orbit at time `t`.
///
/// `distance * (cos(-0.1t), sin(0.1t), sin(-0.1t))`. The path is not a
/// circle: the eye sits `distance * sqrt(1 + sin²(0.1t))` from the origin,
/// swinging between `distance` and `√2 * distance`.
pub fn orbit_position(t: f32, distance: f32) -> Vec3 {
    let a = t * ORBIT_SPEED;
    Vec3::new((-a).cos(), a.sin(), (-a).sin()) * distance
}

/// Orbit camera for viewing the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// World position of the eye.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Build the camera for a fresh scene: just in front of the origin on +z,
    /// with a far plane scaled to the orbit.
    pub fn for_orbit(viewport: Viewport, distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance * INITIAL_DISTANCE_FACTOR),
            target: Vec3::ZERO,
            fov_y: FOV_DEGREES.to_radians(),
            aspect: viewport.aspect(),
            near: NEAR_PLANE,
            far: distance * FAR_FACTOR,
        }
    }

    /// Move the eye and keep looking at the origin.
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
        self.target = Vec3::ZERO;
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined projection * view.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_distance_scales_with_height() {
        let tan35 = 35.0f32.to_radians().tan();
        assert!((orbit_distance(600) - 300.0 / tan35).abs() < 1e-3);
        assert!((orbit_distance(900) - 450.0 / tan35).abs() < 1e-3);
        assert!((orbit_distance(900) / orbit_distance(600) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_radius_follows_path() {
        let d = orbit_distance(720);
        for i in 0..200 {
            let t = i as f32 * 0.37;
            let a = t * 0.1;
            let p = orbit_position(t, d);
            let expected = d * (1.0 + a.sin() * a.sin()).sqrt();
            assert!((p.length() - expected).abs() < d * 1e-5, "t={t} |p|={}", p.length());
            assert!(p.length() >= d * (1.0 - 1e-5));
            assert!(p.length() <= d * 2.0f32.sqrt() * (1.0 + 1e-5));
        }
    }

    #[test]
    fn test_orbit_at_quarter_pi() {
        // 0.1t = π/4 puts every component at the same magnitude.
        let d = orbit_distance(600);
        let p = orbit_position(7.853982, d);
        assert!((p - Vec3::new(302.96, 302.96, -302.96)).length() < 0.05, "p={p:?}");
        assert!((p.length() - 524.74).abs() < 0.05, "|p|={}", p.length());
    }

    #[test]
    fn test_orbit_starts_on_x_axis() {
        let p = orbit_position(0.0, 10.0);
        assert!((p - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_orbit_components_match_trig_path() {
        let (t, d) = (7.5, 250.0);
        let a = t * ORBIT_SPEED;
        let p = orbit_position(t, d);
        assert!((p.x - d * (-a).cos()).abs() < 1e-3);
        assert!((p.y - d * a.sin()).abs() < 1e-3);
        assert!((p.z - d * (-a).sin()).abs() < 1e-3);
    }

    #[test]
    fn test_for_orbit() {
        let vp = Viewport::new(1000, 500);
        let d = orbit_distance(vp.height);
        let cam = Camera::for_orbit(vp, d);

        assert!((cam.position.z - d * 0.008).abs() < 1e-5);
        assert_eq!(cam.target, Vec3::ZERO);
        assert!((cam.far - 5.0 * d).abs() < 1e-3);
        assert_eq!(cam.near, 0.01);
        assert!((cam.aspect - 2.0).abs() < 1e-6);
        assert!((cam.fov_y - 70.0f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let vp = Viewport::new(800, 600);
        let d = orbit_distance(vp.height);
        let mut cam = Camera::for_orbit(vp, d);
        cam.move_to(orbit_position(12.0, d));

        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
