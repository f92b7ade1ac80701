//! Scene orchestration: rebuilds and the per-frame draw.
//!
//! [`SceneController`] owns the camera, lights, the active particle shape
//! and the [`RenderLoop`]. It starts `Uninitialized`; the first
//! [`reinitialize`](SceneController::reinitialize) makes it `Active`, and
//! every later parameter change or resize tears the whole scene down and
//! builds it again.
//!
//! Rebuild requests are coalesced. The controller's parameter subscription
//! and [`request_rebuild`](SceneController::request_rebuild) only raise a
//! flag; the next [`frame`](SceneController::frame) consumes it with a
//! single rebuild before drawing, so a burst of slider events between two
//! frames costs one rebuild and the last value wins.
//!
//! GPU work goes through the [`RenderBackend`] trait. The wgpu
//! implementation lives in [`crate::gpu`]; tests use a recording stub.

pub mod camera;
pub mod lights;
pub mod render_loop;

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{FrameError, ShaderError};
use crate::params::{ParamKey, ParameterStore};
use crate::time::TimeSource;
use crate::viewport::Viewport;

pub use camera::{orbit_distance, orbit_position, Camera};
pub use lights::Lights;
pub use render_loop::{FrameHandle, RenderLoop};

/// The GPU-side particle shape as seen by the controller.
pub trait ShapeRenderer {
    /// Number of particles the shape was built with.
    fn particle_count(&self) -> u32;

    /// Push per-frame values into the shape's uniforms. Never reallocates.
    fn render(&mut self, time: f32, time_scale: f32, angle_number: f32);
}

/// Everything besides the shape that a present call needs.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub camera: &'a Camera,
    pub lights: &'a Lights,
}

/// Creates shapes, releases them, and puts frames on screen.
pub trait RenderBackend {
    type Shape: ShapeRenderer;

    /// Current drawable size.
    fn viewport(&self) -> Viewport;

    /// Allocate buffers and build the shader program for `particle_count` particles.
    fn create_shape(
        &mut self,
        particle_count: u32,
        viewport: Viewport,
    ) -> Result<Self::Shape, ShaderError>;

    /// Free the shape's GPU resources. Called exactly once per created shape.
    fn release_shape(&mut self, shape: Self::Shape);

    /// Upload the shape's uniforms and issue one render call.
    fn present(
        &mut self,
        shape: &mut Self::Shape,
        view: &FrameView<'_>,
    ) -> Result<(), wgpu::SurfaceError>;
}

/// Which parameter changes cause a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildPolicy {
    /// Every change rebuilds the scene.
    #[default]
    Always,
    /// Only particle count changes (and resizes) rebuild; time scale and
    /// angle already reach the shader every frame.
    StructuralOnly,
}

impl RebuildPolicy {
    pub fn requires_rebuild(self, key: ParamKey) -> bool {
        match self {
            RebuildPolicy::Always => true,
            RebuildPolicy::StructuralOnly => key.is_structural(),
        }
    }
}

/// A built scene.
#[derive(Debug)]
pub struct ActiveScene<S> {
    pub viewport: Viewport,
    pub orbit_distance: f32,
    pub camera: Camera,
    pub lights: Lights,
    pub shape: S,
}

#[derive(Debug)]
pub enum SceneState<S> {
    Uninitialized,
    Active(ActiveScene<S>),
}

/// What a call to [`SceneController::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was drawn and the next one scheduled.
    Drawn,
    /// No frame was due, or there is nothing to draw into.
    Idle,
}

/// Owns the scene and drives rebuilds and per-frame drawing.
pub struct SceneController<B: RenderBackend, C: TimeSource> {
    backend: B,
    clock: C,
    params: ParameterStore,
    policy: RebuildPolicy,
    state: SceneState<B::Shape>,
    render_loop: RenderLoop,
    rebuild_requested: Rc<Cell<bool>>,
    rebuild_count: u64,
}

impl<B: RenderBackend, C: TimeSource> SceneController<B, C> {
    /// Create an uninitialized controller and subscribe it to `params`.
    ///
    /// A rebuild is requested immediately, so the first [`frame`](Self::frame)
    /// builds the scene.
    pub fn new(backend: B, clock: C, mut params: ParameterStore, policy: RebuildPolicy) -> Self {
        let rebuild_requested = Rc::new(Cell::new(true));

        let flag = rebuild_requested.clone();
        params.subscribe(move |change| {
            if policy.requires_rebuild(change.key) {
                flag.set(true);
            }
        });

        Self {
            backend,
            clock,
            params,
            policy,
            state: SceneState::Uninitialized,
            render_loop: RenderLoop::new(),
            rebuild_requested,
            rebuild_count: 0,
        }
    }

    // ========== Accessors ==========

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    /// Mutable access for the control panel. Writes go through
    /// [`ParameterStore::set`] and so trigger the controller's subscription.
    pub fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    pub fn state(&self) -> &SceneState<B::Shape> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SceneState::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveScene<B::Shape>> {
        match &self.state {
            SceneState::Active(scene) => Some(scene),
            SceneState::Uninitialized => None,
        }
    }

    pub fn shape(&self) -> Option<&B::Shape> {
        self.active().map(|scene| &scene.shape)
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.active().map(|scene| &scene.camera)
    }

    pub fn orbit_distance(&self) -> Option<f32> {
        self.active().map(|scene| scene.orbit_distance)
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Number of completed rebuilds.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    pub fn rebuild_pending(&self) -> bool {
        self.rebuild_requested.get()
    }

    /// True when the event loop should deliver another frame.
    pub fn wants_frame(&self) -> bool {
        self.rebuild_pending() || self.render_loop.pending().is_some()
    }

    // ========== Lifecycle ==========

    /// Ask for a rebuild before the next frame.
    pub fn request_rebuild(&mut self) {
        self.rebuild_requested.set(true);
    }

    /// The drawable size changed. Rebuilds under every policy.
    pub fn request_resize(&mut self) {
        log::trace!("Resize requested: {:?}", self.backend.viewport());
        self.request_rebuild();
    }

    /// Tear down the current scene and build a new one from the current
    /// parameters and viewport, then start a fresh render loop.
    ///
    /// The old shape is released before the new one is created. If the
    /// viewport is empty the rebuild stays pending and the loop stays
    /// stopped. If the shader fails to build the controller is left
    /// `Uninitialized` and the error is returned.
    pub fn reinitialize(&mut self) -> Result<(), ShaderError> {
        self.render_loop.cancel();

        let viewport = self.backend.viewport();
        if viewport.is_empty() {
            self.rebuild_requested.set(true);
            log::debug!("Deferring rebuild: viewport is {}x{}", viewport.width, viewport.height);
            return Ok(());
        }
        self.rebuild_requested.set(false);

        let orbit = orbit_distance(viewport.height);
        let camera = Camera::for_orbit(viewport, orbit);
        let lights = Lights::for_orbit(orbit);

        if let SceneState::Active(old) = self.take_state() {
            self.backend.release_shape(old.shape);
        }

        let particle_count = self.params.particle_count();
        let shape = self.backend.create_shape(particle_count, viewport)?;

        self.state = SceneState::Active(ActiveScene {
            viewport,
            orbit_distance: orbit,
            camera,
            lights,
            shape,
        });
        self.rebuild_count += 1;

        log::debug!(
            "Scene rebuilt: {} particles, viewport {}x{}, orbit distance {:.1}",
            particle_count,
            viewport.width,
            viewport.height,
            orbit
        );

        self.render_loop.start();
        Ok(())
    }

    /// One iteration of the loop: push time and parameters into the shape,
    /// move the camera along its orbit, present, schedule the next frame.
    ///
    /// Does nothing while uninitialized.
    pub fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let SceneState::Active(scene) = &mut self.state else {
            return Ok(());
        };

        let t = self.clock.elapsed();
        scene
            .shape
            .render(t, self.params.time_scale(), self.params.angle_number());

        scene.camera.move_to(orbit_position(t, scene.orbit_distance));

        let view = FrameView {
            camera: &scene.camera,
            lights: &scene.lights,
        };
        let result = self.backend.present(&mut scene.shape, &view);

        // A failed present skips this frame only; the loop keeps going.
        self.render_loop.schedule();
        result
    }

    /// Handle one redraw: apply a pending rebuild, then run the due frame.
    pub fn frame(&mut self) -> Result<FrameOutcome, FrameError> {
        if self.rebuild_requested.get() {
            self.reinitialize()?;
        }

        let Some(handle) = self.render_loop.pending() else {
            return Ok(FrameOutcome::Idle);
        };
        if !self.render_loop.begin(handle) {
            return Ok(FrameOutcome::Idle);
        }

        self.draw()?;
        Ok(FrameOutcome::Drawn)
    }

    fn take_state(&mut self) -> SceneState<B::Shape> {
        std::mem::replace(&mut self.state, SceneState::Uninitialized)
    }

    /// Release the active shape and stop the loop.
    pub fn shutdown(&mut self) {
        self.render_loop.cancel();
        if let SceneState::Active(old) = self.take_state() {
            self.backend.release_shape(old.shape);
        }
    }
}

impl<B: RenderBackend, C: TimeSource> Drop for SceneController<B, C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
