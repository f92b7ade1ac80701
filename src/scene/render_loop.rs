//! Cancellable per-frame scheduling.
//!
//! The windowing layer delivers one redraw at a time; `RenderLoop` decides
//! whether that redraw belongs to the live loop. Each [`schedule`] hands out
//! a [`FrameHandle`] stamped with the current generation, and [`cancel`]
//! bumps the generation so any handle issued before it is refused. At most
//! one frame is pending at any time.
//!
//! [`schedule`]: RenderLoop::schedule
//! [`cancel`]: RenderLoop::cancel

/// Ticket for one scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    generation: u64,
    frame: u64,
}

impl FrameHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    generation: u64,
    next_frame: u64,
    pending: Option<FrameHandle>,
    running: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new loop generation with its first frame pending.
    ///
    /// Any frame from an earlier generation is cancelled first.
    pub fn start(&mut self) -> FrameHandle {
        self.cancel();
        self.running = true;
        self.schedule()
    }

    /// Queue the next frame of the current generation, replacing any pending one.
    pub fn schedule(&mut self) -> FrameHandle {
        let handle = FrameHandle {
            generation: self.generation,
            frame: self.next_frame,
        };
        self.next_frame += 1;
        self.pending = Some(handle);
        handle
    }

    /// Drop the pending frame and invalidate every handle issued so far.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.running = false;
        self.generation += 1;
    }

    /// The frame waiting to run, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Claim the pending frame for execution if `handle` is it.
    ///
    /// Returns `false` for stale or already-consumed handles.
    pub fn begin(&mut self, handle: FrameHandle) -> bool {
        if self.running && self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_schedules_one_frame() {
        let mut rl = RenderLoop::new();
        assert!(rl.pending().is_none());

        let h = rl.start();
        assert_eq!(rl.pending(), Some(h));
        assert!(rl.is_running());
    }

    #[test]
    fn test_begin_consumes_frame() {
        let mut rl = RenderLoop::new();
        let h = rl.start();
        assert!(rl.begin(h));
        assert!(rl.pending().is_none());
        // Same handle cannot run twice.
        assert!(!rl.begin(h));
    }

    #[test]
    fn test_restart_invalidates_old_handles() {
        let mut rl = RenderLoop::new();
        let old = rl.start();
        let new = rl.start();

        assert_ne!(old.generation(), new.generation());
        assert!(!rl.begin(old));
        assert!(rl.begin(new));
    }

    #[test]
    fn test_cancel_stops_loop() {
        let mut rl = RenderLoop::new();
        let h = rl.start();
        rl.cancel();
        assert!(!rl.is_running());
        assert!(rl.pending().is_none());
        assert!(!rl.begin(h));
    }

    #[test]
    fn test_only_one_pending_frame() {
        let mut rl = RenderLoop::new();
        rl.start();
        let a = rl.schedule();
        let b = rl.schedule();
        assert_eq!(rl.pending(), Some(b));
        assert!(!rl.begin(a));
        assert!(rl.begin(b));
    }
}
