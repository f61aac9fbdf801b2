/// NullGraphicsDevice - GraphicsDevice implementation without a GPU
///
/// Every operation behaves like a real device as far as the abstraction is
/// concerned (resource lifecycle, bindings, statistics, map windows) but no
/// work is submitted anywhere. Unsound requests (foreign or disposed
/// resources, mapping static buffers, ...) fail with `InvalidResource`
/// instead of reaching undefined behavior; the validating wrapper reports
/// the same conditions with more context.

use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    AdapterInfo, BlendState, BlendStateDesc, Buffer, BufferDesc, Config, DepthStencilState,
    DepthStencilStateDesc, DeviceId, DeviceInfo, DeviceStats, Framebuffer, FramebufferDesc,
    GpuResource, GraphicsDevice, IndexType, InputLayout, InputLayoutDesc, MapMode,
    RasterizerState, RasterizerStateDesc, Rect2D, ResourceKind, ResourceRegistry, SamplerState,
    SamplerStateDesc, Shader, ShaderDesc, SwapchainInfo, Texture, TextureDesc, TextureRegion,
    Viewport, MAX_SWAP_INTERVAL,
};
use crate::{engine_debug, engine_info, engine_trace, engine_warn};
use super::{
    NullBlendState, NullBuffer, NullDepthStencilState, NullFramebuffer, NullInputLayout,
    NullRasterizerState, NullSamplerState, NullShader, NullTexture,
};

const LOG_SOURCE: &str = "galaxy3d::null";

/// Most recently bound object of each category
#[derive(Default)]
struct BoundState {
    shader: Option<Arc<dyn Shader>>,
    textures: FxHashMap<u32, Arc<dyn Texture>>,
    samplers: FxHashMap<u32, Arc<dyn SamplerState>>,
    rasterizer: Option<Arc<dyn RasterizerState>>,
    blend: Option<Arc<dyn BlendState>>,
    depth_stencil: Option<Arc<dyn DepthStencilState>>,
    input_layout: Option<Arc<dyn InputLayout>>,
    vertex_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
    index_buffer: Option<(Arc<dyn Buffer>, IndexType)>,
    uniform_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
    storage_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
    framebuffer: Option<Arc<dyn Framebuffer>>,
}

/// Store or clear a slot binding
fn bind_slot<T: ?Sized>(slots: &mut FxHashMap<u32, Arc<T>>, slot: u32, value: Option<&Arc<T>>) {
    match value {
        Some(value) => {
            slots.insert(slot, Arc::clone(value));
        }
        None => {
            slots.remove(&slot);
        }
    }
}

/// Null graphics device
pub struct NullGraphicsDevice {
    id: DeviceId,
    info: DeviceInfo,
    swapchain: SwapchainInfo,
    registry: ResourceRegistry,
    bound: BoundState,
    viewport: Viewport,
    scissor: Rect2D,
    /// Window handed out by `map_buffer`
    map_scratch: Vec<u8>,
    draw_calls: u64,
    dispatch_calls: u64,
    frames_presented: u64,
    disposed: bool,
}

impl NullGraphicsDevice {
    /// Registry name of this backend
    pub const BACKEND_NAME: &'static str = "null";

    /// Create a null device for the given configuration
    pub fn new(config: &Config) -> Self {
        let id = DeviceId::next();
        engine_info!(LOG_SOURCE, "Null graphics device #{} created for '{}' ({}x{})",
            id.raw(), config.app_name, config.backbuffer_width, config.backbuffer_height);

        Self {
            id,
            info: DeviceInfo {
                backend: Self::BACKEND_NAME.to_string(),
                validated: false,
                adapter: AdapterInfo {
                    name: "Null Adapter".to_string(),
                    vendor: "Galaxy3D".to_string(),
                    driver_version: env!("CARGO_PKG_VERSION").to_string(),
                },
            },
            swapchain: SwapchainInfo {
                width: config.backbuffer_width,
                height: config.backbuffer_height,
                format: config.backbuffer_format,
                swap_interval: config.swap_interval.min(MAX_SWAP_INTERVAL),
            },
            registry: ResourceRegistry::new(),
            bound: BoundState::default(),
            viewport: Viewport::from_extent(config.backbuffer_width, config.backbuffer_height),
            scissor: Rect2D::from_extent(config.backbuffer_width, config.backbuffer_height),
            map_scratch: Vec::new(),
            draw_calls: 0,
            dispatch_calls: 0,
            frames_presented: 0,
            disposed: false,
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.disposed {
            Err(Error::DeviceDisposed)
        } else {
            Ok(())
        }
    }

    /// Resolve a resource to its null implementation
    ///
    /// Fails for disposed resources and for resources created by another device.
    fn resolve<'a, T, R>(&self, resource: &'a R) -> Result<&'a T>
    where
        T: 'static,
        R: GpuResource + ?Sized,
    {
        self.ensure_alive()?;
        if resource.device_id() != self.id {
            return Err(Error::InvalidResource(format!(
                "{} '{}' belongs to device #{}, not #{}",
                resource.kind(),
                resource.label(),
                resource.device_id().raw(),
                self.id.raw()
            )));
        }
        if resource.is_disposed() {
            return Err(Error::InvalidResource(format!(
                "{} '{}' has been disposed",
                resource.kind(),
                resource.label()
            )));
        }
        resource.as_any().downcast_ref::<T>().ok_or_else(|| {
            Error::InvalidResource(format!(
                "{} '{}' was not created by the null backend",
                resource.kind(),
                resource.label()
            ))
        })
    }

    /// Resolve an optional binding (clearing a slot is always allowed)
    fn check_binding<T, R>(&self, resource: Option<&Arc<R>>) -> Result<()>
    where
        T: 'static,
        R: GpuResource + ?Sized,
    {
        self.ensure_alive()?;
        if let Some(resource) = resource {
            self.resolve::<T, R>(&**resource)?;
        }
        Ok(())
    }

    fn dynamic_buffer<'a>(&self, buffer: &'a Arc<dyn Buffer>) -> Result<&'a NullBuffer> {
        let null_buffer = self.resolve::<NullBuffer, _>(&**buffer)?;
        if !buffer.is_dynamic() {
            return Err(Error::InvalidResource(format!(
                "{} '{}' is static and cannot be written or mapped",
                buffer.buffer_type(),
                buffer.label()
            )));
        }
        Ok(null_buffer)
    }
}

impl GraphicsDevice for NullGraphicsDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== FACTORIES =====

    fn create_buffer(&mut self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.ensure_alive()?;
        if desc.size == 0 {
            return Err(Error::InvalidResource(format!("buffer '{}' has size 0", desc.label)));
        }
        if let Some(data) = data {
            if data.len() as u64 > desc.size {
                return Err(Error::InvalidResource(format!(
                    "buffer '{}' initial data ({} bytes) exceeds size {}",
                    desc.label,
                    data.len(),
                    desc.size
                )));
            }
        }

        let device_id = self.id;
        let buffer = self.registry.register(|id| Ok(NullBuffer::new(id, device_id, desc)))?;
        engine_debug!(LOG_SOURCE, "Created {} '{}' ({} bytes, dynamic: {})",
            desc.buffer_type, desc.label, desc.size, desc.dynamic);
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        self.ensure_alive()?;
        desc.check()?;

        let device_id = self.id;
        let texture = self.registry.register(|id| NullTexture::new(id, device_id, desc, data))?;
        engine_debug!(LOG_SOURCE, "Created texture '{}' ({}x{}x{}, {:?}, {} mips, {} host bytes)",
            desc.label, desc.width, desc.height, desc.depth, desc.format,
            desc.mip_levels, texture.size_in_bytes());
        Ok(texture)
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        self.ensure_alive()?;
        let device_id = self.id;
        let shader = self.registry.register(|id| NullShader::new(id, device_id, desc))?;
        engine_debug!(LOG_SOURCE, "Linked shader '{}' ({} stages)", desc.label, desc.stages.len());
        Ok(shader)
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Arc<dyn RasterizerState>> {
        self.ensure_alive()?;
        let device_id = self.id;
        Ok(self.registry.register(|id| Ok(NullRasterizerState::new(id, device_id, desc)))?)
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Arc<dyn BlendState>> {
        self.ensure_alive()?;
        let device_id = self.id;
        Ok(self.registry.register(|id| Ok(NullBlendState::new(id, device_id, desc)))?)
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Arc<dyn DepthStencilState>> {
        self.ensure_alive()?;
        let device_id = self.id;
        Ok(self.registry.register(|id| Ok(NullDepthStencilState::new(id, device_id, desc)))?)
    }

    fn create_sampler_state(&mut self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>> {
        self.ensure_alive()?;
        let device_id = self.id;
        Ok(self.registry.register(|id| Ok(NullSamplerState::new(id, device_id, desc)))?)
    }

    fn create_input_layout(&mut self, desc: &InputLayoutDesc) -> Result<Arc<dyn InputLayout>> {
        self.ensure_alive()?;
        let device_id = self.id;
        Ok(self.registry.register(|id| Ok(NullInputLayout::new(id, device_id, desc)))?)
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        self.ensure_alive()?;
        for attachment in desc.attachments() {
            self.resolve::<NullTexture, _>(&**attachment)?;
        }
        let device_id = self.id;
        let framebuffer = self.registry.register(|id| NullFramebuffer::new(id, device_id, desc))?;
        engine_debug!(LOG_SOURCE, "Created framebuffer '{}' ({}x{})",
            desc.label, framebuffer.width(), framebuffer.height());
        Ok(framebuffer)
    }

    // ===== DATA TRANSFER =====

    fn update_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        self.dynamic_buffer(buffer)?;
        let end = offset.checked_add(data.len() as u64);
        if end.is_none_or(|end| end > buffer.size()) {
            return Err(Error::InvalidResource(format!(
                "update of {} bytes at offset {} exceeds buffer '{}' ({} bytes)",
                data.len(),
                offset,
                buffer.label(),
                buffer.size()
            )));
        }
        Ok(())
    }

    fn update_texture(&mut self, texture: &Arc<dyn Texture>, region: &TextureRegion, data: &[u8]) -> Result<()> {
        let null_texture = self.resolve::<NullTexture, _>(&**texture)?;
        null_texture.write_region(region, data)
    }

    fn map_buffer(&mut self, buffer: &Arc<dyn Buffer>, mode: MapMode) -> Result<&mut [u8]> {
        let null_buffer = self.dynamic_buffer(buffer)?;
        let len = usize::try_from(buffer.size()).map_err(|_| Error::OutOfMemory)?;
        if !null_buffer.begin_map() {
            return Err(Error::InvalidResource(format!(
                "buffer '{}' is already mapped",
                buffer.label()
            )));
        }
        engine_trace!(LOG_SOURCE, "Mapped buffer '{}' ({:?})", buffer.label(), mode);

        self.map_scratch.clear();
        self.map_scratch.resize(len, 0);
        Ok(&mut self.map_scratch[..])
    }

    fn unmap_buffer(&mut self, buffer: &Arc<dyn Buffer>) -> Result<()> {
        let null_buffer = self.resolve::<NullBuffer, _>(&**buffer)?;
        if !null_buffer.end_map() {
            return Err(Error::InvalidResource(format!(
                "buffer '{}' is not mapped",
                buffer.label()
            )));
        }
        Ok(())
    }

    // ===== PIPELINE STATE =====

    fn set_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()> {
        self.check_binding::<NullShader, _>(shader)?;
        self.bound.shader = shader.cloned();
        Ok(())
    }

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture>>) -> Result<()> {
        self.check_binding::<NullTexture, _>(texture)?;
        bind_slot(&mut self.bound.textures, slot, texture);
        Ok(())
    }

    fn set_sampler_state(&mut self, slot: u32, sampler: Option<&Arc<dyn SamplerState>>) -> Result<()> {
        self.check_binding::<NullSamplerState, _>(sampler)?;
        bind_slot(&mut self.bound.samplers, slot, sampler);
        Ok(())
    }

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn RasterizerState>>) -> Result<()> {
        self.check_binding::<NullRasterizerState, _>(state)?;
        self.bound.rasterizer = state.cloned();
        Ok(())
    }

    fn set_blend_state(&mut self, state: Option<&Arc<dyn BlendState>>) -> Result<()> {
        self.check_binding::<NullBlendState, _>(state)?;
        self.bound.blend = state.cloned();
        Ok(())
    }

    fn set_depth_stencil_state(&mut self, state: Option<&Arc<dyn DepthStencilState>>) -> Result<()> {
        self.check_binding::<NullDepthStencilState, _>(state)?;
        self.bound.depth_stencil = state.cloned();
        Ok(())
    }

    fn set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>) -> Result<()> {
        self.check_binding::<NullInputLayout, _>(layout)?;
        self.bound.input_layout = layout.cloned();
        Ok(())
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>, _stride: u32, _offset: u64) -> Result<()> {
        self.check_binding::<NullBuffer, _>(buffer)?;
        bind_slot(&mut self.bound.vertex_buffers, slot, buffer);
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, index_type: IndexType, _offset: u64) -> Result<()> {
        self.check_binding::<NullBuffer, _>(buffer)?;
        self.bound.index_buffer = buffer.map(|buffer| (Arc::clone(buffer), index_type));
        Ok(())
    }

    fn set_uniform_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()> {
        self.check_binding::<NullBuffer, _>(buffer)?;
        bind_slot(&mut self.bound.uniform_buffers, slot, buffer);
        Ok(())
    }

    fn set_storage_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()> {
        self.check_binding::<NullBuffer, _>(buffer)?;
        bind_slot(&mut self.bound.storage_buffers, slot, buffer);
        Ok(())
    }

    fn set_framebuffer(&mut self, framebuffer: Option<&Arc<dyn Framebuffer>>) -> Result<()> {
        self.check_binding::<NullFramebuffer, _>(framebuffer)?;
        self.bound.framebuffer = framebuffer.cloned();
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.ensure_alive()?;
        self.viewport = viewport;
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.ensure_alive()?;
        self.scissor = scissor;
        Ok(())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scissor(&self) -> Rect2D {
        self.scissor
    }

    // ===== SUBMISSION =====

    fn draw(&mut self, _vertex_count: u32, _first_vertex: u32) -> Result<()> {
        self.ensure_alive()?;
        self.draw_calls += 1;
        Ok(())
    }

    fn draw_indexed(&mut self, _index_count: u32, _first_index: u32, _base_vertex: i32) -> Result<()> {
        self.ensure_alive()?;
        self.draw_calls += 1;
        Ok(())
    }

    fn draw_indexed_instanced(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _base_vertex: i32,
        _first_instance: u32,
    ) -> Result<()> {
        self.ensure_alive()?;
        self.draw_calls += 1;
        Ok(())
    }

    fn dispatch(&mut self, _groups_x: u32, _groups_y: u32, _groups_z: u32) -> Result<()> {
        self.ensure_alive()?;
        self.dispatch_calls += 1;
        Ok(())
    }

    fn present(&mut self, swap_interval: u32) -> Result<()> {
        self.ensure_alive()?;
        self.swapchain.swap_interval = swap_interval.min(MAX_SWAP_INTERVAL);
        self.frames_presented += 1;
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        self.resolve::<NullTexture, _>(&**texture)?;
        let desc = texture.desc();
        if desc.format.is_block_compressed() {
            return Err(Error::UnsupportedFormat(format!(
                "cannot generate mipmaps for block-compressed texture '{}' ({:?})",
                desc.label, desc.format
            )));
        }
        if !desc.texture_type.is_mipmappable() {
            return Err(Error::InvalidResource(format!(
                "texture '{}' of type {:?} has no mip chain",
                desc.label, desc.texture_type
            )));
        }
        if desc.mip_levels == 1 {
            engine_warn!(LOG_SOURCE, "Texture '{}' has a single mip level, nothing to generate", desc.label);
            return Ok(());
        }
        engine_trace!(LOG_SOURCE, "Generated {} mip levels for '{}'", desc.mip_levels, desc.label);
        Ok(())
    }

    // ===== LIFETIME =====

    fn swapchain(&self) -> &SwapchainInfo {
        &self.swapchain
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.ensure_alive()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidResource(format!(
                "swapchain cannot be resized to {}x{}",
                width, height
            )));
        }
        self.swapchain.width = width;
        self.swapchain.height = height;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.ensure_alive()
    }

    fn stats(&self) -> DeviceStats {
        let mut stats = DeviceStats {
            draw_calls: self.draw_calls,
            dispatch_calls: self.dispatch_calls,
            frames_presented: self.frames_presented,
            ..DeviceStats::default()
        };
        for resource in self.registry.live() {
            match resource.kind() {
                ResourceKind::Buffer => {
                    if let Some(buffer) = resource.as_any().downcast_ref::<NullBuffer>() {
                        stats.buffers_alive += 1;
                        stats.buffer_memory += buffer.size();
                    }
                }
                ResourceKind::Texture => {
                    if let Some(texture) = resource.as_any().downcast_ref::<NullTexture>() {
                        stats.textures_alive += 1;
                        stats.texture_memory += texture.size_in_bytes();
                    }
                }
                _ => {}
            }
        }
        stats
    }

    fn outstanding_resources(&mut self) -> FxHashMap<ResourceKind, usize> {
        self.registry.live_counts()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let released = self.registry.dispose_all();
        self.bound = BoundState::default();
        self.map_scratch = Vec::new();
        self.disposed = true;
        engine_info!(LOG_SOURCE, "Null graphics device #{} disposed ({} resources released)",
            self.id.raw(), released);
    }
}

#[cfg(test)]
#[path = "null_graphics_device_tests.rs"]
mod tests;
