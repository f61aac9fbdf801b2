/// GraphicsDevice trait - the single polymorphic device contract
///
/// Every backend (null, hardware, validating wrapper) implements this trait.
/// The device is the factory for all GPU objects, holds the currently bound
/// pipeline state and submits draw/dispatch work. Command submission is
/// single-threaded: callers sharing a device across threads must serialize
/// access externally (e.g. `Arc<Mutex<dyn GraphicsDevice>>`).

use std::sync::{Arc, Mutex, OnceLock};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::format::TextureFormat;
use crate::graphics_device::{
    BlendState, BlendStateDesc, Buffer, BufferDesc, DepthStencilState, DepthStencilStateDesc,
    DeviceId, Framebuffer, FramebufferDesc, IndexType, InputLayout, InputLayoutDesc, MapMode,
    RasterizerState, RasterizerStateDesc, ResourceKind, SamplerState, SamplerStateDesc, Shader,
    ShaderDesc, Texture, TextureDesc, TextureRegion,
};
use crate::null::NullGraphicsDevice;
use crate::validation::ValidatedGraphicsDevice;

// ============================================================================
// Common types
// ============================================================================

/// Viewport rectangle with depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering `width` x `height` with the [0, 1] depth range
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Integer rectangle (scissor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    pub fn from_extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }
}

/// Graphics adapter description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: String,
    pub driver_version: String,
}

/// Identity of a device instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Backend identifier ("null", "vulkan", ...)
    pub backend: String,
    /// True when the validating wrapper is layered on top
    pub validated: bool,
    pub adapter: AdapterInfo,
}

/// Current swapchain (backbuffer) properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Interval used by the last `present`
    pub swap_interval: u32,
}

/// Accumulated device statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub draw_calls: u64,
    pub dispatch_calls: u64,
    pub frames_presented: u64,
    pub buffers_alive: u32,
    pub textures_alive: u32,
    /// Logical bytes of live buffers
    pub buffer_memory: u64,
    /// Bytes of live texture storage
    pub texture_memory: u64,
}

/// Highest swap interval accepted by `present`
pub const MAX_SWAP_INTERVAL: u32 = 4;

// ============================================================================
// Configuration
// ============================================================================

/// Policy for turning validation diagnostics into hard failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Report only; calls keep forwarding to the wrapped backend
    Never,
    /// Error-severity violations fail the call with `Error::ValidationFailed`
    ///
    /// `dispose()` cannot fail, so an escalated dispose is dropped instead:
    /// disposing a mapped buffer leaves it mapped and alive.
    Errors,
    /// Warnings fail the call too
    All,
}

/// Validating wrapper configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Layer the validating wrapper over the backend
    pub enabled: bool,
    pub escalation: Escalation,
    /// Report outstanding resources when the device is disposed
    pub track_resources: bool,
    /// Number of violations kept in the history (oldest dropped first)
    pub max_recorded_violations: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            escalation: Escalation::Never,
            track_resources: true,
            max_recorded_violations: 256,
        }
    }
}

/// Device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application name
    pub app_name: String,
    pub backbuffer_width: u32,
    pub backbuffer_height: u32,
    pub backbuffer_format: TextureFormat,
    /// Swap interval reported before the first present
    pub swap_interval: u32,
    pub validation: ValidationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Galaxy3D Application".to_string(),
            backbuffer_width: 1280,
            backbuffer_height: 720,
            backbuffer_format: TextureFormat::B8G8R8A8_SRGB,
            swap_interval: 1,
            validation: ValidationConfig::default(),
        }
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Main graphics device trait
///
/// Bind operations accept `None` to clear a slot. Draw and dispatch use
/// whatever state is currently bound; only the validating wrapper checks
/// that the required state is present.
pub trait GraphicsDevice: Send + Sync {
    /// Process-unique id of this device instance
    fn id(&self) -> DeviceId;

    /// Backend and adapter description
    fn info(&self) -> &DeviceInfo;

    /// True after `dispose()`
    fn is_disposed(&self) -> bool;

    // ===== FACTORIES =====

    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor (type, size, dynamic flag)
    /// * `data` - Optional initial contents, at most `desc.size` bytes
    fn create_buffer(&mut self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>>;

    /// Create a texture
    ///
    /// # Arguments
    ///
    /// * `desc` - Texture descriptor; fully determines the initial data length
    /// * `data` - Optional base-level data of every layer, pre-flattened into
    ///   one contiguous region (see `format::combine`)
    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>>;

    /// Compile and link a shader program; no partially linked program is ever returned
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Arc<dyn RasterizerState>>;

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Arc<dyn BlendState>>;

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Arc<dyn DepthStencilState>>;

    fn create_sampler_state(&mut self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>>;

    fn create_input_layout(&mut self, desc: &InputLayoutDesc) -> Result<Arc<dyn InputLayout>>;

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    // ===== DATA TRANSFER =====

    /// Overwrite part of a dynamic buffer
    fn update_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()>;

    /// Overwrite a region of a texture (static textures included)
    fn update_texture(&mut self, texture: &Arc<dyn Texture>, region: &TextureRegion, data: &[u8]) -> Result<()>;

    /// Map a dynamic buffer for direct CPU access
    ///
    /// The returned window spans the whole buffer. The buffer must be
    /// unmapped before it can be mapped again or disposed.
    fn map_buffer(&mut self, buffer: &Arc<dyn Buffer>, mode: MapMode) -> Result<&mut [u8]>;

    /// End a mapping started by `map_buffer`
    fn unmap_buffer(&mut self, buffer: &Arc<dyn Buffer>) -> Result<()>;

    // ===== PIPELINE STATE =====

    fn set_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()>;

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture>>) -> Result<()>;

    fn set_sampler_state(&mut self, slot: u32, sampler: Option<&Arc<dyn SamplerState>>) -> Result<()>;

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn RasterizerState>>) -> Result<()>;

    fn set_blend_state(&mut self, state: Option<&Arc<dyn BlendState>>) -> Result<()>;

    fn set_depth_stencil_state(&mut self, state: Option<&Arc<dyn DepthStencilState>>) -> Result<()>;

    fn set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>) -> Result<()>;

    /// Bind a vertex buffer to an input slot
    fn set_vertex_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>, stride: u32, offset: u64) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, index_type: IndexType, offset: u64) -> Result<()>;

    fn set_uniform_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()>;

    fn set_storage_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()>;

    /// Bind a framebuffer; `None` targets the swapchain backbuffer
    fn set_framebuffer(&mut self, framebuffer: Option<&Arc<dyn Framebuffer>>) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    fn viewport(&self) -> Viewport;

    fn scissor(&self) -> Rect2D;

    // ===== SUBMISSION =====

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) -> Result<()>;

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) -> Result<()>;

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) -> Result<()>;

    /// Display the current backbuffer
    ///
    /// # Arguments
    ///
    /// * `swap_interval` - Refresh intervals to wait, `0..=MAX_SWAP_INTERVAL`
    fn present(&mut self, swap_interval: u32) -> Result<()>;

    /// Fill mip levels 1.. from the base level
    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()>;

    // ===== LIFETIME =====

    fn swapchain(&self) -> &SwapchainInfo;

    /// Notify the device that the window has been resized
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Submit all pending work
    fn flush(&mut self) -> Result<()>;

    fn stats(&self) -> DeviceStats;

    /// Live (not disposed, not dropped) resources per kind
    fn outstanding_resources(&mut self) -> FxHashMap<ResourceKind, usize>;

    /// Release the backend and every resource it created
    fn dispose(&mut self);
}

// ============================================================================
// Backend registry
// ============================================================================

/// Backend factory function type
pub type BackendFactory = Arc<dyn Fn(&Config) -> Result<Box<dyn GraphicsDevice>> + Send + Sync>;

/// Registry of selectable backends
///
/// The `"null"` backend is always present. Hardware backends live in their
/// own crates and register themselves at startup.
pub struct BackendRegistry {
    backends: FxHashMap<&'static str, BackendFactory>,
}

impl BackendRegistry {
    /// Registry with the built-in backends
    pub fn new() -> Self {
        let mut registry = Self {
            backends: FxHashMap::default(),
        };
        registry.register_backend(NullGraphicsDevice::BACKEND_NAME, |config| {
            Ok(Box::new(NullGraphicsDevice::new(config)) as Box<dyn GraphicsDevice>)
        });
        registry
    }

    /// Register (or replace) a backend
    pub fn register_backend<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(&Config) -> Result<Box<dyn GraphicsDevice>> + Send + Sync + 'static,
    {
        self.backends.insert(name, Arc::new(factory));
    }

    /// Factory registered under `name`
    pub fn factory(&self, name: &str) -> Result<BackendFactory> {
        self.backends.get(name).cloned().ok_or_else(|| {
            Error::InitializationFailed(format!("Backend '{}' not registered", name))
        })
    }

    /// Instantiate a backend by name
    pub fn create_backend(&self, name: &str, config: &Config) -> Result<Box<dyn GraphicsDevice>> {
        let factory = self.factory(name)?;
        factory(config)
    }

    /// Registered backend names, sorted
    pub fn backend_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.backends.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static BACKEND_REGISTRY: OnceLock<Mutex<BackendRegistry>> = OnceLock::new();

/// Get the global backend registry
pub fn backend_registry() -> &'static Mutex<BackendRegistry> {
    BACKEND_REGISTRY.get_or_init(|| Mutex::new(BackendRegistry::new()))
}

/// Register a backend in the global registry
pub fn register_backend<F>(name: &'static str, factory: F) -> Result<()>
where
    F: Fn(&Config) -> Result<Box<dyn GraphicsDevice>> + Send + Sync + 'static,
{
    backend_registry()
        .lock()
        .map_err(|_| Error::BackendError("Backend registry lock poisoned".to_string()))?
        .register_backend(name, factory);
    Ok(())
}

/// Create a device from the global registry
///
/// The validating wrapper is layered on top when `config.validation.enabled`.
/// The registry lock is released before the factory runs, so factories may
/// use the registry themselves.
pub fn create_graphics_device(backend: &str, config: &Config) -> Result<Box<dyn GraphicsDevice>> {
    let factory = backend_registry()
        .lock()
        .map_err(|_| Error::BackendError("Backend registry lock poisoned".to_string()))?
        .factory(backend)?;
    let device = factory(config)?;

    if config.validation.enabled {
        Ok(Box::new(ValidatedGraphicsDevice::new(device, config.validation.clone())))
    } else {
        Ok(device)
    }
}

#[cfg(test)]
#[path = "graphics_device_tests.rs"]
mod tests;
