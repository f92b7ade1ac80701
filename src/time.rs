//! Clock for driving the animation.
//!
//! The shape is a pure function of elapsed wall-clock time, so the clock
//! only needs to answer "how long since start" and never stalls with the
//! frame rate. Frame counting and FPS are kept for diagnostics.
//!
//! # Example
//!
//! ```ignore
//! use whorl::time::Clock;
//!
//! let mut clock = Clock::new();
//!
//! // In the frame loop:
//! clock.tick();
//! println!("Elapsed: {:.2}s", clock.elapsed());
//! println!("FPS: {:.1}", clock.fps());
//! ```

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of elapsed seconds for the scene.
///
/// Implemented by [`Clock`] for real time and by [`ManualClock`] where a
/// test needs to pin the animation to a specific instant.
pub trait TimeSource {
    /// Seconds since construction or the last reset. Never decreases.
    fn elapsed(&self) -> f32;
}

/// Monotonic real-time clock.
#[derive(Debug)]
pub struct Clock {
    /// When the clock was created or last reset.
    start: Instant,
    /// Total ticks since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
}

impl Clock {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Set how often [`tick`](Self::tick) refreshes the FPS estimate.
    pub fn with_fps_interval(mut self, interval: Duration) -> Self {
        self.fps_update_interval = interval;
        self
    }

    /// Record a rendered frame. Returns `true` when the FPS estimate was
    /// refreshed on this tick.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            return true;
        }
        false
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Restart the clock from zero.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
    }
}

impl TimeSource for Clock {
    #[inline]
    fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Clock whose time only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f32>,
}

impl ManualClock {
    pub fn new(start: f32) -> Self {
        Self {
            now: Cell::new(start.max(0.0)),
        }
    }

    /// Jump to `t` seconds. Earlier times are ignored to stay monotonic.
    pub fn set(&self, t: f32) {
        if t > self.now.get() {
            self.now.set(t);
        }
    }

    pub fn advance(&self, dt: f32) {
        self.set(self.now.get() + dt.max(0.0));
    }
}

impl TimeSource for ManualClock {
    fn elapsed(&self) -> f32 {
        self.now.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::rc::Rc<T> {
    fn elapsed(&self) -> f32 {
        (**self).elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_new() {
        let clock = Clock::new();
        assert_eq!(clock.frame(), 0);
        assert!(clock.elapsed() < 1.0);
    }

    #[test]
    fn test_clock_monotonic() {
        let clock = Clock::new();
        let first = clock.elapsed();
        thread::sleep(Duration::from_millis(10));
        let second = clock.elapsed();

        assert!(second > first);
        assert!(second >= 0.01);
    }

    #[test]
    fn test_clock_elapsed_ignores_ticks() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(5));
        let before = clock.elapsed();
        for _ in 0..100 {
            clock.tick();
        }
        // Ticking counts frames, it does not move time.
        assert!(clock.elapsed() >= before);
        assert_eq!(clock.frame(), 100);
    }

    #[test]
    fn test_clock_reset() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(20));
        clock.tick();
        clock.reset();

        assert_eq!(clock.frame(), 0);
        assert!(clock.elapsed() < 0.02);
    }

    #[test]
    fn test_manual_clock_never_goes_back() {
        let clock = ManualClock::new(5.0);
        clock.set(3.0);
        assert_eq!(clock.elapsed(), 5.0);

        clock.advance(1.5);
        assert_eq!(clock.elapsed(), 6.5);

        clock.advance(-10.0);
        assert_eq!(clock.elapsed(), 6.5);
    }
}
