//! Error types for whorl.
//!
//! Failure modes are narrow: the graphics context can fail to come up, a
//! shader stage can fail to compile, and the window or event loop can fail
//! to be created. All of them are fatal at startup.

use std::fmt;

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format for this adapter.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. \
                 Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => {
                write!(f, "Surface is not supported by the selected adapter")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Pipeline stage a shader diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// Linking both stages into a render pipeline.
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
            ShaderStage::Link => write!(f, "pipeline link"),
        }
    }
}

/// A shader stage failed to compile, or the stages failed to link.
#[derive(Debug, Clone)]
pub struct ShaderError {
    pub stage: ShaderStage,
    /// Compiler diagnostic as reported by wgpu.
    pub diagnostic: String,
}

impl ShaderError {
    pub fn new(stage: ShaderStage, diagnostic: impl Into<String>) -> Self {
        Self {
            stage,
            diagnostic: diagnostic.into(),
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} shader failed to build: {}", self.stage, self.diagnostic)
    }
}

impl std::error::Error for ShaderError {}

/// A frame could not be produced.
#[derive(Debug)]
pub enum FrameError {
    /// Rebuilding the scene failed; the controller is left uninitialized.
    Shader(ShaderError),
    /// The surface could not hand out a texture this frame.
    Surface(wgpu::SurfaceError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Shader(e) => write!(f, "Scene rebuild failed: {}", e),
            FrameError::Surface(e) => write!(f, "Surface error: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Shader(e) => Some(e),
            FrameError::Surface(e) => Some(e),
        }
    }
}

impl From<ShaderError> for FrameError {
    fn from(e: ShaderError) -> Self {
        FrameError::Shader(e)
    }
}

impl From<wgpu::SurfaceError> for FrameError {
    fn from(e: wgpu::SurfaceError) -> Self {
        FrameError::Surface(e)
    }
}

/// Errors that can occur when running a sketch.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The particle shader could not be built.
    Shader(ShaderError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Shader(e) => write!(f, "Shader error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Shader(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ShaderError> for AppError {
    fn from(e: ShaderError) -> Self {
        AppError::Shader(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_error_names_stage() {
        let err = ShaderError::new(ShaderStage::Fragment, "unknown identifier `colr`");
        let msg = err.to_string();
        assert!(msg.starts_with("fragment shader"));
        assert!(msg.contains("colr"));
    }

    #[test]
    fn test_app_error_wraps_shader_source() {
        use std::error::Error;

        let err = AppError::from(ShaderError::new(ShaderStage::Vertex, "bad"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("vertex"));
    }

    #[test]
    fn test_no_adapter_message_is_single_line() {
        let msg = GpuError::NoAdapter.to_string();
        assert_eq!(
            msg,
            "No compatible GPU adapter found. \
             Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
        );
        assert!(msg.contains("found. Ensure"));
        assert!(!msg.contains('\n'));
    }

    #[test]
    fn test_frame_error_from_surface() {
        let err = FrameError::from(wgpu::SurfaceError::Lost);
        assert!(matches!(err, FrameError::Surface(wgpu::SurfaceError::Lost)));
        assert!(err.to_string().starts_with("Surface error"));
    }
}
