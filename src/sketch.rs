//! Sketch builder and runner.

use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::{App, AppConfig};
use crate::error::AppError;
use crate::params::{ParameterStore, Parameters};
use crate::scene::RebuildPolicy;

/// Configures and runs the particle sketch.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// use whorl::prelude::*;
///
/// Sketch::new()
///     .with_particle_count(20_000)
///     .with_angle_number(90.0)
///     .run()?;
/// ```
#[derive(Debug, Clone)]
pub struct Sketch {
    params: Parameters,
    policy: RebuildPolicy,
    title: String,
    window_size: (u32, u32),
}

impl Sketch {
    /// Create a sketch with default settings.
    pub fn new() -> Self {
        Self {
            params: Parameters::default(),
            policy: RebuildPolicy::default(),
            title: "whorl".to_string(),
            window_size: (1280, 720),
        }
    }

    /// Set the starting particle count. Clamped to `[100, 300000]` in steps of 100.
    pub fn with_particle_count(mut self, count: u32) -> Self {
        self.params.particle_count = count;
        self
    }

    /// Set the starting time scale. Clamped to `[0.0001, 1]`.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.params.time_scale = time_scale;
        self
    }

    /// Set the starting angle number. Clamped to `[0, 360]` in steps of 30.
    pub fn with_angle_number(mut self, angle_number: f32) -> Self {
        self.params.angle_number = angle_number;
        self
    }

    /// Choose which parameter changes rebuild the scene.
    pub fn with_rebuild_policy(mut self, policy: RebuildPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// The starting parameters after clamping.
    pub fn parameters(&self) -> Parameters {
        ParameterStore::with_values(self.params).snapshot()
    }

    pub fn rebuild_policy(&self) -> RebuildPolicy {
        self.policy
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(AppConfig {
            params: self.parameters(),
            policy: self.policy,
            title: self.title,
            window_size: self.window_size,
        });
        event_loop.run_app(&mut app)?;

        match app.take_error() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new()
    }
}
