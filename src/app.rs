//! winit application: window, GPU bootstrap and event routing.

use std::sync::Arc;
use std::time::Duration;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::error::{AppError, FrameError};
use crate::gpu::{GpuContext, WgpuBackend};
use crate::input::InputTracker;
use crate::params::{ParameterStore, Parameters};
use crate::scene::{FrameOutcome, RebuildPolicy, RenderBackend, SceneController};
use crate::time::Clock;

/// How often the frame rate is logged.
const FPS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Window and startup settings collected by the builder.
#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub title: String,
    pub window_size: (u32, u32),
    pub params: Parameters,
    pub policy: RebuildPolicy,
}

pub(crate) struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    controller: Option<SceneController<WgpuBackend, Clock>>,
    input: InputTracker,
    /// First fatal error, handed back to the caller after the loop exits.
    error: Option<AppError>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            window: None,
            controller: None,
            input: InputTracker::new(),
            error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    /// Stop on a fatal error. The error is returned from `Sketch::run`.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        if let Some(controller) = self.controller.as_mut() {
            controller.shutdown();
        }
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.config.window_size;
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        #[allow(unused_mut)]
        let mut backend = WgpuBackend::new(gpu);
        #[cfg(feature = "egui")]
        backend.attach_egui(&window);

        let store = ParameterStore::with_values(self.config.params);
        let clock = Clock::new().with_fps_interval(FPS_LOG_INTERVAL);
        let mut controller = SceneController::new(backend, clock, store, self.config.policy);

        // Build once up front so a broken shader fails before the first frame.
        controller.reinitialize()?;
        log::info!(
            "Started with {} particles, time scale {}, angle {}",
            controller.params().particle_count(),
            controller.params().time_scale(),
            controller.params().angle_number()
        );

        window.request_redraw();
        self.window = Some(window);
        self.controller = Some(controller);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        #[cfg(feature = "egui")]
        {
            let snapshot = controller.params().snapshot();
            let fps = controller.clock().fps();
            let mut edits = Vec::new();
            if let Some(egui) = controller.backend_mut().egui_mut() {
                let output = egui.run(window, |ctx| {
                    edits = crate::panel::show(ctx, &snapshot, fps);
                });
                controller.backend_mut().set_egui_output(output);
            }
            for change in edits {
                controller.params_mut().set(change.key, change.value);
            }
        }

        match controller.frame() {
            Ok(FrameOutcome::Drawn) => {
                if controller.clock_mut().tick() {
                    log::debug!("{:.1} fps", controller.clock().fps());
                }
            }
            Ok(FrameOutcome::Idle) => {}
            Err(FrameError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::debug!("Surface lost, reconfiguring");
                controller.backend().reconfigure();
            }
            Err(FrameError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of GPU memory");
                event_loop.exit();
                return;
            }
            Err(FrameError::Surface(e)) => log::warn!("Surface error: {}", e),
            Err(FrameError::Shader(e)) => {
                self.fail(event_loop, e.into());
                return;
            }
        }

        if controller.render_loop().pending().is_some() {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        #[cfg(feature = "egui")]
        if let Some(egui) = controller.backend_mut().egui_mut() {
            if egui.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                controller.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                controller.backend_mut().resize(physical_size);
                controller.request_resize();
                if controller.wants_frame() {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                let viewport = controller.backend().viewport();
                if self.input.handle_event(&other, viewport) {
                    log::trace!(
                        "Input: pointer {:?}, delta {:.3}",
                        self.input.pointer(),
                        self.input.delta()
                    );
                }
            }
        }
    }
}
