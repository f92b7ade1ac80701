//! wgpu device setup and the on-screen [`RenderBackend`].

#[cfg(feature = "egui")]
pub mod egui_integration;
pub mod particle_system;

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::{GpuError, ShaderError};
use crate::particles::ParticleBuffer;
use crate::scene::{FrameView, RenderBackend};
use crate::viewport::Viewport;

#[cfg(feature = "egui")]
use egui_integration::{EguiFrameOutput, EguiIntegration};
pub use particle_system::ParticleSystem;

/// Surface, device and queue for one window.
pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigure the surface for a new size. Zero-area sizes are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapply the current configuration after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

/// Draws particle shapes into a window surface.
pub struct WgpuBackend {
    gpu: GpuContext,
    /// Last size reported by the window; may be zero while minimized.
    window_size: PhysicalSize<u32>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    #[cfg(feature = "egui")]
    egui_output: Option<EguiFrameOutput>,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let window_size = PhysicalSize::new(gpu.config.width, gpu.config.height);
        Self {
            gpu,
            window_size,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            egui_output: None,
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.window_size = new_size;
        self.gpu.resize(new_size);
    }

    pub fn reconfigure(&self) {
        self.gpu.reconfigure();
    }

    #[cfg(feature = "egui")]
    pub fn attach_egui(&mut self, window: &Arc<Window>) {
        self.egui = Some(EguiIntegration::new(&self.gpu.device, self.gpu.format(), window));
    }

    #[cfg(feature = "egui")]
    pub fn egui_mut(&mut self) -> Option<&mut EguiIntegration> {
        self.egui.as_mut()
    }

    /// Queue UI output to be drawn on top of the next frame.
    #[cfg(feature = "egui")]
    pub fn set_egui_output(&mut self, output: EguiFrameOutput) {
        self.egui_output = Some(output);
    }

    #[cfg(feature = "egui")]
    fn render_egui(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let (Some(egui), Some(output)) = (self.egui.as_mut(), self.egui_output.take()) else {
            return;
        };

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
            pixels_per_point: output.pixels_per_point,
        };
        egui.prepare(&self.gpu.device, &self.gpu.queue, encoder, &output, &screen_descriptor);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            egui.renderer()
                .render(&mut pass, &output.paint_jobs, &screen_descriptor);
        }

        egui.cleanup(&output);
    }
}

impl RenderBackend for WgpuBackend {
    type Shape = ParticleSystem;

    fn viewport(&self) -> Viewport {
        Viewport::from(self.window_size)
    }

    fn create_shape(
        &mut self,
        particle_count: u32,
        viewport: Viewport,
    ) -> Result<ParticleSystem, ShaderError> {
        let particles = ParticleBuffer::random(particle_count);
        ParticleSystem::new(&self.gpu.device, self.gpu.format(), &particles, viewport)
    }

    fn release_shape(&mut self, shape: ParticleSystem) {
        shape.release();
    }

    fn present(
        &mut self,
        shape: &mut ParticleSystem,
        view: &FrameView<'_>,
    ) -> Result<(), wgpu::SurfaceError> {
        shape.set_view_proj(view.camera.view_proj());
        shape.upload(&self.gpu.queue);

        let output = self.gpu.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Particle Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            shape.draw(&mut render_pass);
        }

        #[cfg(feature = "egui")]
        self.render_egui(&mut encoder, &target);

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
