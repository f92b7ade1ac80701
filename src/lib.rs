//! # whorl
//!
//! A live-tunable particle line strip that winds into a spiral, with a
//! camera that never stops orbiting it.
//!
//! Every particle starts on the z axis; the vertex shader bends the strip
//! into a spiral driven by elapsed time and three parameters, and the
//! fragment shader colours it with a drifting cosine palette.
//!
//! ## Quick Start
//!
//! ```ignore
//! use whorl::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     Sketch::new()
//!         .with_particle_count(6000)
//!         .with_time_scale(0.001)
//!         .with_angle_number(120.0)
//!         .run()
//! }
//! ```
//!
//! ## Parameters
//!
//! | Parameter | Range | Step |
//! |-----------|-------|------|
//! | particle count | 100 – 300000 | 100 |
//! | time scale | 0.0001 – 1 | 0.0001 |
//! | angle number | 0 – 360 | 30 |
//!
//! Values written to the [`ParameterStore`] are clamped and snapped, then
//! every subscriber is notified. The [`SceneController`] subscribes once and
//! rebuilds the whole scene on the next frame (see [`RebuildPolicy`]).
//!
//! ## Features
//!
//! - `egui` adds a slider panel for the three parameters.
//!
//! ## Testing without a GPU
//!
//! [`SceneController`] is generic over a [`RenderBackend`] and a
//! [`TimeSource`], so rebuild and draw logic can be driven by a stub backend
//! and a [`ManualClock`](time::ManualClock).

mod app;
pub mod error;
pub mod gpu;
pub mod input;
#[cfg(feature = "egui")]
pub mod panel;
pub mod params;
pub mod particles;
pub mod scene;
pub mod shader;
mod sketch;
pub mod time;
pub mod viewport;

pub use error::{AppError, FrameError, GpuError, ShaderError, ShaderStage};
pub use glam::{Vec2, Vec3};
pub use input::{InputTracker, InteractionHandler};
pub use params::{ParamChange, ParamKey, ParamSpec, ParameterStore, Parameters};
pub use particles::ParticleBuffer;
pub use scene::{RebuildPolicy, RenderBackend, SceneController, ShapeRenderer};
pub use sketch::Sketch;
pub use time::{Clock, TimeSource};
pub use viewport::Viewport;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::error::AppError;
    pub use crate::params::{ParamKey, ParameterStore, Parameters};
    pub use crate::scene::RebuildPolicy;
    pub use crate::sketch::Sketch;
    pub use crate::{Vec2, Vec3};
    #[cfg(feature = "egui")]
    pub use egui;
}
