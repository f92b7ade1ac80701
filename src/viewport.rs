//! Drawable area dimensions.

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimised window reports a zero-sized surface; nothing can be drawn into it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Falls back to 1.0 for an empty viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Map a pixel position to normalized device coordinates.
    ///
    /// The left/right edges map to -1/1 on x; the top/bottom edges map to 1/-1 on y.
    pub fn to_ndc(&self, x_px: f32, y_px: f32) -> (f32, f32) {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        ((x_px / w) * 2.0 - 1.0, -(y_px / h) * 2.0 + 1.0)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndc_corners() {
        let vp = Viewport::new(800, 600);
        assert_eq!(vp.to_ndc(0.0, 0.0), (-1.0, 1.0));
        assert_eq!(vp.to_ndc(800.0, 600.0), (1.0, -1.0));
        assert_eq!(vp.to_ndc(400.0, 300.0), (0.0, 0.0));
    }

    #[test]
    fn test_empty_viewport() {
        assert!(Viewport::new(0, 600).is_empty());
        assert_eq!(Viewport::new(0, 0).aspect(), 1.0);
        assert!((Viewport::new(1600, 900).aspect() - 16.0 / 9.0).abs() < 1e-6);
    }
}
