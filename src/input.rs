//! Pointer, touch and wheel tracking.
//!
//! [`InputTracker`] keeps a normalized pointer position, the pixel vectors
//! of the current touch drag, and an unbounded `delta` accumulator fed by
//! wheel and vertical touch drags. It is written against the
//! [`InteractionHandler`] capability trait so it can be driven directly in
//! tests; [`InputTracker::handle_event`] adapts raw winit events onto it.
//!
//! Nothing in the renderer reads this state yet. The accumulator survives
//! scene rebuilds and resizes.

use glam::{Vec2, Vec3};
use winit::event::{MouseScrollDelta, Touch, TouchPhase, WindowEvent};

use crate::viewport::Viewport;

/// Scale applied to wheel deltas before they are subtracted from `delta`.
pub const WHEEL_SCALE: f32 = 0.01;
/// Scale applied to vertical touch displacement.
pub const TOUCH_SCALE: f32 = 0.0001;
/// Pixels per wheel line for devices that report line deltas.
pub const PIXELS_PER_LINE: f32 = 100.0;
/// Starting value of the interaction accumulator.
pub const INITIAL_DELTA: f32 = 1.0;

/// Input capabilities, independent of any windowing library.
///
/// Coordinates are in surface pixels with the origin at the top-left.
pub trait InteractionHandler {
    fn on_pointer_move(&mut self, x_px: f32, y_px: f32, viewport: Viewport);
    fn on_touch_start(&mut self, x_px: f32, y_px: f32, viewport: Viewport);
    fn on_touch_move(&mut self, x_px: f32, y_px: f32, viewport: Viewport);
    fn on_touch_end(&mut self);
    /// `delta_y` follows the browser convention: positive scrolls down.
    fn on_wheel(&mut self, delta_y: f32);
}

/// Interaction state fed by pointer, touch and wheel events.
#[derive(Debug, Clone)]
pub struct InputTracker {
    pointer: Vec2,
    // `None` is the neutral state outside a touch gesture.
    touch_start: Option<Vec3>,
    touch_move: Option<Vec3>,
    touch_end: Option<Vec3>,
    delta: f32,
    // Finger being followed; other fingers are ignored until it lifts.
    active_touch: Option<u64>,
}

impl InputTracker {
    /// Create a tracker with a centred pointer and the initial accumulator value.
    pub fn new() -> Self {
        Self {
            pointer: Vec2::ZERO,
            touch_start: None,
            touch_move: None,
            touch_end: None,
            delta: INITIAL_DELTA,
            active_touch: None,
        }
    }

    // ========== Queries ==========

    /// Pointer position in normalized device coordinates (-1 to 1, y up).
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Where the current touch began, in pixels.
    pub fn touch_start(&self) -> Option<Vec3> {
        self.touch_start
    }

    /// Latest touch position, in pixels.
    pub fn touch_move(&self) -> Option<Vec3> {
        self.touch_move
    }

    /// `touch_start - touch_move` for the current gesture.
    pub fn touch_end(&self) -> Option<Vec3> {
        self.touch_end
    }

    /// Accumulated wheel/drag interaction. Unbounded.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// True when no touch gesture is in progress.
    pub fn is_touch_neutral(&self) -> bool {
        self.touch_start.is_none() && self.touch_move.is_none() && self.touch_end.is_none()
    }

    fn update_pointer(&mut self, x_px: f32, y_px: f32, viewport: Viewport) {
        let (x, y) = viewport.to_ndc(x_px, y_px);
        self.pointer = Vec2::new(x, y);
    }

    // ========== winit adapter ==========

    /// Route a winit window event onto the capability methods.
    ///
    /// Returns `true` if the event was an input event this tracker consumed.
    pub fn handle_event(&mut self, event: &WindowEvent, viewport: Viewport) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_pointer_move(position.x as f32, position.y as f32, viewport);
                true
            }

            WindowEvent::Touch(touch) => {
                self.handle_touch(touch, viewport);
                true
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports positive y for scrolling up; flip to "positive is down".
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -*y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                self.on_wheel(delta_y);
                true
            }

            _ => false,
        }
    }

    fn handle_touch(&mut self, touch: &Touch, viewport: Viewport) {
        let (x, y) = (touch.location.x as f32, touch.location.y as f32);
        match touch.phase {
            TouchPhase::Started => {
                if self.active_touch.is_none() {
                    self.active_touch = Some(touch.id);
                    self.on_touch_start(x, y, viewport);
                }
            }
            TouchPhase::Moved => {
                if self.active_touch == Some(touch.id) {
                    self.on_touch_move(x, y, viewport);
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.active_touch == Some(touch.id) {
                    self.active_touch = None;
                    self.on_touch_end();
                }
            }
        }
    }
}

impl InteractionHandler for InputTracker {
    fn on_pointer_move(&mut self, x_px: f32, y_px: f32, viewport: Viewport) {
        self.update_pointer(x_px, y_px, viewport);
    }

    fn on_touch_start(&mut self, x_px: f32, y_px: f32, viewport: Viewport) {
        self.touch_start = Some(Vec3::new(x_px, y_px, 0.0));
        self.update_pointer(x_px, y_px, viewport);
    }

    fn on_touch_move(&mut self, x_px: f32, y_px: f32, viewport: Viewport) {
        let moved = Vec3::new(x_px, y_px, 0.0);
        self.touch_move = Some(moved);
        self.update_pointer(x_px, y_px, viewport);

        // A move without a recorded start has nothing to measure against.
        let Some(start) = self.touch_start else {
            return;
        };

        let end = Vec3::new(start.x - moved.x, start.y - moved.y, 0.0);
        self.touch_end = Some(end);

        let step = (end.y - start.y) * TOUCH_SCALE;
        if moved.y < start.y {
            self.delta += step;
        } else {
            self.delta -= step;
        }
    }

    fn on_touch_end(&mut self) {
        self.touch_start = None;
        self.touch_move = None;
        self.touch_end = None;
    }

    fn on_wheel(&mut self, delta_y: f32) {
        self.delta -= delta_y * WHEEL_SCALE;
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}
