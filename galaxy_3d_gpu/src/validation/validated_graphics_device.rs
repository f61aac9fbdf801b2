/// ValidatedGraphicsDevice - validating decorator over any GraphicsDevice
///
/// Every operation re-checks its preconditions, reports violations to the
/// shared `ValidationContext` and then forwards to the wrapped backend.
/// Resources handed out are `Validated<..>` decorators owning exactly one
/// backend resource each.
///
/// Violations never change what the backend sees, with one exception:
/// blocking violations (disposed or foreign resources, writes to static
/// buffers, map misuse, out-of-bounds writes) fail the call without
/// forwarding because there is nothing sound to forward.

use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendState, BlendStateDesc, Buffer, BufferDesc, BufferType, DepthStencilState,
    DepthStencilStateDesc, DeviceId, DeviceInfo, DeviceStats, Framebuffer, FramebufferDesc,
    GpuResource, GraphicsDevice, IndexType, InputLayout, InputLayoutDesc, MapMode,
    RasterizerState, RasterizerStateDesc, Rect2D, ResourceKind, ResourceRegistry, SamplerState,
    SamplerStateDesc, Shader, ShaderDesc, ShaderStage, SwapchainInfo, Texture, TextureDesc,
    TextureRegion, TextureUsage, ValidationConfig, Viewport, MAX_SWAP_INTERVAL,
};
use crate::engine_info;
use super::validated_resource::{
    Validated, ValidatedBlendState, ValidatedBuffer, ValidatedDepthStencilState,
    ValidatedFramebuffer, ValidatedInputLayout, ValidatedRasterizerState, ValidatedSamplerState,
    ValidatedShader, ValidatedTexture, Wrapped,
};
use super::validation_context::{ValidationContext, ValidationStats};
use super::violation::{Violation, ViolationKind};

const LOG_SOURCE: &str = "galaxy3d::validation";

/// Bindable slot tracked by the validating layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindPoint {
    Shader,
    VertexBuffer(u32),
    IndexBuffer,
    Framebuffer,
}

/// State of a bindable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unbound,
    Bound,
    /// The bound object has been disposed since it was bound
    Invalidated,
}

struct IndexBinding {
    buffer: Arc<dyn Buffer>,
    index_type: IndexType,
    offset: u64,
}

#[derive(Default)]
struct Bindings {
    shader: Option<Arc<dyn Shader>>,
    vertex_buffers: FxHashMap<u32, Arc<dyn Buffer>>,
    index_buffer: Option<IndexBinding>,
    framebuffer: Option<Arc<dyn Framebuffer>>,
}

fn slot_state<R: GpuResource + ?Sized>(bound: Option<&Arc<R>>) -> SlotState {
    match bound {
        None => SlotState::Unbound,
        Some(resource) if resource.is_disposed() => SlotState::Invalidated,
        Some(_) => SlotState::Bound,
    }
}

/// Validating graphics device
pub struct ValidatedGraphicsDevice {
    inner: Box<dyn GraphicsDevice>,
    context: Arc<ValidationContext>,
    registry: ResourceRegistry,
    info: DeviceInfo,
    bindings: Bindings,
    disposed: bool,
}

impl ValidatedGraphicsDevice {
    /// Layer validation over `inner`
    pub fn new(inner: Box<dyn GraphicsDevice>, config: ValidationConfig) -> Self {
        let info = DeviceInfo {
            validated: true,
            ..inner.info().clone()
        };
        let context = Arc::new(ValidationContext::new(config, inner.id()));
        engine_info!(LOG_SOURCE, "Validation enabled on '{}' device #{} (escalation: {:?})",
            info.backend, inner.id().raw(), context.config().escalation);

        Self {
            inner,
            context,
            registry: ResourceRegistry::new(),
            info,
            bindings: Bindings::default(),
            disposed: false,
        }
    }

    /// Shared diagnostic sink (also held by every validated resource)
    pub fn context(&self) -> &Arc<ValidationContext> {
        &self.context
    }

    /// Recorded violations, oldest first
    pub fn violations(&self) -> Vec<Violation> {
        self.context.violations()
    }

    pub fn validation_stats(&self) -> ValidationStats {
        self.context.stats()
    }

    /// Current state of a bindable slot
    pub fn slot_state(&self, point: BindPoint) -> SlotState {
        match point {
            BindPoint::Shader => slot_state(self.bindings.shader.as_ref()),
            BindPoint::VertexBuffer(slot) => slot_state(self.bindings.vertex_buffers.get(&slot)),
            BindPoint::IndexBuffer => slot_state(self.bindings.index_buffer.as_ref().map(|b| &b.buffer)),
            BindPoint::Framebuffer => slot_state(self.bindings.framebuffer.as_ref()),
        }
    }

    // ===== CHECK HELPERS =====

    /// Report a non-blocking violation; fails only if escalation says so
    fn check(&self, operation: &'static str, kind: ViolationKind) -> Result<()> {
        self.context.report(operation, kind)
    }

    /// Report a blocking violation and produce the error that fails the call
    fn block(&self, operation: &'static str, kind: ViolationKind) -> Error {
        match self.context.report(operation, kind) {
            Err(error) => error,
            Ok(()) => Error::ValidationFailed(operation.to_string()),
        }
    }

    fn check_alive(&self, operation: &'static str) -> Result<()> {
        if self.disposed {
            return Err(self.block(operation, ViolationKind::DeviceDisposed));
        }
        Ok(())
    }

    /// Find the decorator behind a resource handed back by the caller
    fn unwrap<'a, T, W>(&self, operation: &'static str, resource: &'a Arc<T>) -> Result<&'a Validated<T>>
    where
        T: GpuResource + ?Sized + 'static,
        W: Wrapped<T> + 'static,
    {
        self.check_alive(operation)?;
        let foreign = || ViolationKind::ForeignResource {
            kind: resource.kind(),
            label: resource.label().to_string(),
        };
        if resource.device_id() != self.inner.id() {
            return Err(self.block(operation, foreign()));
        }
        let wrapper = match resource.as_any().downcast_ref::<W>() {
            Some(wrapper) => wrapper.wrapped(),
            None => return Err(self.block(operation, foreign())),
        };
        if resource.is_disposed() {
            return Err(self.block(operation, ViolationKind::DisposedResource {
                kind: resource.kind(),
                label: resource.label().to_string(),
            }));
        }
        Ok(wrapper)
    }

    /// Unwrap an optional binding to the backend resource
    fn unwrap_binding<T, W>(&self, operation: &'static str, resource: Option<&Arc<T>>) -> Result<Option<Arc<T>>>
    where
        T: GpuResource + ?Sized + 'static,
        W: Wrapped<T> + 'static,
    {
        self.check_alive(operation)?;
        match resource {
            Some(resource) => Ok(Some(Arc::clone(self.unwrap::<T, W>(operation, resource)?.inner()))),
            None => Ok(None),
        }
    }

    fn register<T: GpuResource + ?Sized + 'static>(&mut self, inner: Arc<T>) -> Result<Arc<Validated<T>>> {
        let context = Arc::clone(&self.context);
        self.registry.register(|id| Ok(Validated::new(inner, id, context)))
    }

    fn check_buffer_type(&self, operation: &'static str, buffer: Option<&Arc<dyn Buffer>>, expected: BufferType) -> Result<()> {
        match buffer {
            Some(buffer) if buffer.buffer_type() != expected => self.check(operation, ViolationKind::BufferTypeMismatch {
                expected,
                actual: buffer.buffer_type(),
                label: buffer.label().to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_shader(&self, operation: &'static str, compute: bool) -> Result<()> {
        match &self.bindings.shader {
            None => self.check(operation, ViolationKind::MissingBinding { binding: "shader" }),
            Some(shader) if shader.is_disposed() => self.check(operation, ViolationKind::InvalidatedBinding {
                binding: "shader",
                label: shader.label().to_string(),
            }),
            Some(shader) if shader.is_compute() != compute => self.check(operation, ViolationKind::ShaderKindMismatch {
                label: shader.label().to_string(),
                expected_compute: compute,
            }),
            Some(_) => Ok(()),
        }
    }

    fn check_framebuffer(&self, operation: &'static str) -> Result<()> {
        let Some(framebuffer) = &self.bindings.framebuffer else {
            return Ok(());
        };
        if framebuffer.is_disposed() {
            return self.check(operation, ViolationKind::InvalidatedBinding {
                binding: "framebuffer",
                label: framebuffer.label().to_string(),
            });
        }
        if let Some(attachment) = framebuffer.disposed_attachment() {
            self.check(operation, ViolationKind::DisposedAttachment {
                framebuffer: framebuffer.label().to_string(),
                attachment: attachment.label().to_string(),
            })?;
        }
        Ok(())
    }

    fn check_vertex_buffers(&self, operation: &'static str, required: bool) -> Result<()> {
        if required && self.bindings.vertex_buffers.is_empty() {
            self.check(operation, ViolationKind::MissingBinding { binding: "vertex buffer" })?;
        }
        if let Some(buffer) = self.bindings.vertex_buffers.values().find(|buffer| buffer.is_disposed()) {
            self.check(operation, ViolationKind::InvalidatedBinding {
                binding: "vertex buffer",
                label: buffer.label().to_string(),
            })?;
        }
        Ok(())
    }

    fn check_index_range(&self, operation: &'static str, first_index: u32, index_count: u32) -> Result<()> {
        let Some(binding) = &self.bindings.index_buffer else {
            return self.check(operation, ViolationKind::MissingBinding { binding: "index buffer" });
        };
        if binding.buffer.is_disposed() {
            return self.check(operation, ViolationKind::InvalidatedBinding {
                binding: "index buffer",
                label: binding.buffer.label().to_string(),
            });
        }
        let size = binding.buffer.size();
        let available = (size - binding.offset.min(size)) / binding.index_type.size_bytes() as u64;
        if first_index as u64 + index_count as u64 > available {
            self.check(operation, ViolationKind::IndexOutOfRange { first_index, index_count, available })?;
        }
        Ok(())
    }

    fn check_count(&self, operation: &'static str, count: u32, what: &str) -> Result<()> {
        if count == 0 {
            self.check(operation, ViolationKind::EmptySubmission {
                detail: format!("{} of 0 {}", operation, what),
            })?;
        }
        Ok(())
    }
}

impl GraphicsDevice for ValidatedGraphicsDevice {
    fn id(&self) -> DeviceId {
        self.inner.id()
    }

    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ===== FACTORIES =====

    fn create_buffer(&mut self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        const OP: &str = "create_buffer";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?} (initial data: {:?} bytes)", OP, desc, data.map(<[u8]>::len));

        if desc.size == 0 {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: "buffer size is 0".to_string(),
            })?;
        }
        if let Some(data) = data {
            if data.len() as u64 > desc.size {
                self.check(OP, ViolationKind::InvalidDescription {
                    label: desc.label.clone(),
                    detail: format!("initial data of {} bytes exceeds size {}", data.len(), desc.size),
                })?;
            }
        }

        let inner = self.inner.create_buffer(desc, data)?;
        Ok(self.register(inner)?)
    }

    fn create_texture(&mut self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        const OP: &str = "create_texture";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?} (initial data: {:?} bytes)", OP, desc, data.map(<[u8]>::len));

        if let Err(error) = desc.check() {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: error.to_string(),
            })?;
        } else if let (Some(data), Ok(expected)) = (data, desc.data_size()) {
            if data.len() as u64 != expected {
                self.check(OP, ViolationKind::InvalidDescription {
                    label: desc.label.clone(),
                    detail: format!("initial data of {} bytes, format and extent require {}", data.len(), expected),
                })?;
            }
        }

        let inner = self.inner.create_texture(desc, data)?;
        Ok(self.register(inner)?)
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        const OP: &str = "create_shader";
        self.check_alive(OP)?;
        let stages: Vec<ShaderStage> = desc.stages.iter().map(|attachment| attachment.stage).collect();
        engine_info!(LOG_SOURCE, "{}: '{}' stages {:?}, {} specialization constants",
            OP, desc.label, stages, desc.specialization.len());

        let invalid = |detail: &str| ViolationKind::InvalidShaderStages {
            label: desc.label.clone(),
            detail: detail.to_string(),
        };
        let mut sorted = stages.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if stages.is_empty() {
            self.check(OP, invalid("no stages attached"))?;
        } else if sorted.len() != stages.len() {
            self.check(OP, invalid("a stage is attached more than once"))?;
        } else if desc.has_stage(ShaderStage::Compute) && stages.len() > 1 {
            self.check(OP, invalid("compute stage mixed with graphics stages"))?;
        } else if !desc.has_stage(ShaderStage::Compute) && !desc.has_stage(ShaderStage::Vertex) {
            self.check(OP, invalid("graphics program without a vertex stage"))?;
        }

        let inner = self.inner.create_shader(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerStateDesc) -> Result<Arc<dyn RasterizerState>> {
        const OP: &str = "create_rasterizer_state";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?}", OP, desc);

        let inner = self.inner.create_rasterizer_state(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_blend_state(&mut self, desc: &BlendStateDesc) -> Result<Arc<dyn BlendState>> {
        const OP: &str = "create_blend_state";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?}", OP, desc);

        if desc.independent_blend && desc.render_targets.is_empty() {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: "independent blend without render target descriptions".to_string(),
            })?;
        }

        let inner = self.inner.create_blend_state(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilStateDesc) -> Result<Arc<dyn DepthStencilState>> {
        const OP: &str = "create_depth_stencil_state";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?}", OP, desc);

        if desc.depth_write_enable && !desc.depth_test_enable {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: "depth writes enabled with depth test disabled".to_string(),
            })?;
        }

        let inner = self.inner.create_depth_stencil_state(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_sampler_state(&mut self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>> {
        const OP: &str = "create_sampler_state";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?}", OP, desc);

        if desc.max_anisotropy == 0 || desc.max_anisotropy > SamplerStateDesc::MAX_ANISOTROPY {
            self.check(OP, ViolationKind::AnisotropyOutOfRange {
                label: desc.label.clone(),
                value: desc.max_anisotropy,
            })?;
        }
        if desc.min_lod > desc.max_lod {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: format!("min LOD {} above max LOD {}", desc.min_lod, desc.max_lod),
            })?;
        }

        let inner = self.inner.create_sampler_state(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_input_layout(&mut self, desc: &InputLayoutDesc) -> Result<Arc<dyn InputLayout>> {
        const OP: &str = "create_input_layout";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: {:?}", OP, desc);

        let mut locations = FxHashSet::default();
        for element in &desc.elements {
            if !locations.insert(element.location) {
                self.check(OP, ViolationKind::DuplicateInputLocation {
                    label: desc.label.clone(),
                    location: element.location,
                })?;
            }
        }

        let inner = self.inner.create_input_layout(desc)?;
        Ok(self.register(inner)?)
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        const OP: &str = "create_framebuffer";
        self.check_alive(OP)?;
        engine_info!(LOG_SOURCE, "{}: '{}' ({} color attachments, depth: {})",
            OP, desc.label, desc.color_attachments.len(), desc.depth_stencil_attachment.is_some());

        let mut inner_desc = FramebufferDesc {
            label: desc.label.clone(),
            color_attachments: Vec::with_capacity(desc.color_attachments.len()),
            depth_stencil_attachment: None,
        };
        for attachment in &desc.color_attachments {
            let wrapper = self.unwrap::<dyn Texture, ValidatedTexture>(OP, attachment)?;
            inner_desc.color_attachments.push(Arc::clone(wrapper.inner()));
        }
        if let Some(attachment) = &desc.depth_stencil_attachment {
            let wrapper = self.unwrap::<dyn Texture, ValidatedTexture>(OP, attachment)?;
            inner_desc.depth_stencil_attachment = Some(Arc::clone(wrapper.inner()));
        }

        if desc.attachments().next().is_none() {
            self.check(OP, ViolationKind::InvalidDescription {
                label: desc.label.clone(),
                detail: "framebuffer has no attachments".to_string(),
            })?;
        } else if let Err(error) = desc.extent() {
            self.check(OP, ViolationKind::AttachmentMismatch {
                framebuffer: desc.label.clone(),
                detail: error.to_string(),
            })?;
        }
        for attachment in &desc.color_attachments {
            if !attachment.desc().usage.contains(TextureUsage::RENDER_TARGET) {
                self.check(OP, ViolationKind::MissingUsage {
                    label: attachment.label().to_string(),
                    required: TextureUsage::RENDER_TARGET,
                })?;
            }
        }
        if let Some(attachment) = &desc.depth_stencil_attachment {
            let attachment_desc = attachment.desc();
            if !attachment_desc.usage.contains(TextureUsage::DEPTH_STENCIL) {
                self.check(OP, ViolationKind::MissingUsage {
                    label: attachment.label().to_string(),
                    required: TextureUsage::DEPTH_STENCIL,
                })?;
            }
            if !attachment_desc.format.is_depth() {
                self.check(OP, ViolationKind::AttachmentMismatch {
                    framebuffer: desc.label.clone(),
                    detail: format!("depth attachment '{}' has color format {:?}",
                        attachment.label(), attachment_desc.format),
                })?;
            }
        }

        let inner = self.inner.create_framebuffer(&inner_desc)?;
        let context = Arc::clone(&self.context);
        let framebuffer = self
            .registry
            .register(|id| Ok(ValidatedFramebuffer::new(inner, id, context, desc.clone())))?;
        Ok(framebuffer)
    }

    // ===== DATA TRANSFER =====

    fn update_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64, data: &[u8]) -> Result<()> {
        const OP: &str = "update_buffer";
        let wrapper = self.unwrap::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        if !buffer.is_dynamic() {
            return Err(self.block(OP, ViolationKind::StaticBufferWrite {
                buffer_type: buffer.buffer_type(),
                label: buffer.label().to_string(),
            }));
        }
        let end = offset.checked_add(data.len() as u64);
        if end.is_none_or(|end| end > buffer.size()) {
            return Err(self.block(OP, ViolationKind::OutOfBounds {
                label: buffer.label().to_string(),
                detail: format!("{} bytes at offset {} exceed size {}", data.len(), offset, buffer.size()),
            }));
        }
        self.inner.update_buffer(wrapper.inner(), offset, data)
    }

    fn update_texture(&mut self, texture: &Arc<dyn Texture>, region: &TextureRegion, data: &[u8]) -> Result<()> {
        const OP: &str = "update_texture";
        let wrapper = self.unwrap::<dyn Texture, ValidatedTexture>(OP, texture)?;
        let desc = texture.desc();
        let expected = region
            .check_bounds(desc)
            .and_then(|_| region.data_size(desc.format))
            .map_err(|error| {
                self.block(OP, ViolationKind::OutOfBounds {
                    label: desc.label.clone(),
                    detail: error.to_string(),
                })
            })?;
        if data.len() as u64 != expected {
            return Err(self.block(OP, ViolationKind::DataLength {
                label: desc.label.clone(),
                expected,
                actual: data.len() as u64,
            }));
        }
        self.inner.update_texture(wrapper.inner(), region, data)
    }

    fn map_buffer(&mut self, buffer: &Arc<dyn Buffer>, mode: MapMode) -> Result<&mut [u8]> {
        const OP: &str = "map_buffer";
        let wrapper = self.unwrap::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        if !buffer.is_dynamic() {
            return Err(self.block(OP, ViolationKind::StaticBufferWrite {
                buffer_type: buffer.buffer_type(),
                label: buffer.label().to_string(),
            }));
        }
        if wrapper.is_mapped_here() {
            return Err(self.block(OP, ViolationKind::AlreadyMapped {
                label: buffer.label().to_string(),
            }));
        }
        let window = self.inner.map_buffer(wrapper.inner(), mode)?;
        wrapper.set_mapped(true);
        Ok(window)
    }

    fn unmap_buffer(&mut self, buffer: &Arc<dyn Buffer>) -> Result<()> {
        const OP: &str = "unmap_buffer";
        let wrapper = self.unwrap::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        if !wrapper.is_mapped_here() {
            return Err(self.block(OP, ViolationKind::NotMapped {
                label: buffer.label().to_string(),
            }));
        }
        self.inner.unmap_buffer(wrapper.inner())?;
        wrapper.set_mapped(false);
        Ok(())
    }

    // ===== PIPELINE STATE =====

    fn set_shader(&mut self, shader: Option<&Arc<dyn Shader>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn Shader, ValidatedShader>("set_shader", shader)?;
        self.inner.set_shader(inner.as_ref())?;
        self.bindings.shader = shader.cloned();
        Ok(())
    }

    fn set_texture(&mut self, slot: u32, texture: Option<&Arc<dyn Texture>>) -> Result<()> {
        const OP: &str = "set_texture";
        let inner = self.unwrap_binding::<dyn Texture, ValidatedTexture>(OP, texture)?;
        if let Some(texture) = texture {
            if !texture.desc().usage.contains(TextureUsage::SAMPLED) {
                self.check(OP, ViolationKind::MissingUsage {
                    label: texture.label().to_string(),
                    required: TextureUsage::SAMPLED,
                })?;
            }
        }
        self.inner.set_texture(slot, inner.as_ref())
    }

    fn set_sampler_state(&mut self, slot: u32, sampler: Option<&Arc<dyn SamplerState>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn SamplerState, ValidatedSamplerState>("set_sampler_state", sampler)?;
        self.inner.set_sampler_state(slot, inner.as_ref())
    }

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn RasterizerState>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn RasterizerState, ValidatedRasterizerState>("set_rasterizer_state", state)?;
        self.inner.set_rasterizer_state(inner.as_ref())
    }

    fn set_blend_state(&mut self, state: Option<&Arc<dyn BlendState>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn BlendState, ValidatedBlendState>("set_blend_state", state)?;
        self.inner.set_blend_state(inner.as_ref())
    }

    fn set_depth_stencil_state(&mut self, state: Option<&Arc<dyn DepthStencilState>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn DepthStencilState, ValidatedDepthStencilState>("set_depth_stencil_state", state)?;
        self.inner.set_depth_stencil_state(inner.as_ref())
    }

    fn set_input_layout(&mut self, layout: Option<&Arc<dyn InputLayout>>) -> Result<()> {
        let inner = self.unwrap_binding::<dyn InputLayout, ValidatedInputLayout>("set_input_layout", layout)?;
        self.inner.set_input_layout(inner.as_ref())
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>, stride: u32, offset: u64) -> Result<()> {
        const OP: &str = "set_vertex_buffer";
        let inner = self.unwrap_binding::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        self.check_buffer_type(OP, buffer, BufferType::Vertex)?;
        self.inner.set_vertex_buffer(slot, inner.as_ref(), stride, offset)?;
        match buffer {
            Some(buffer) => {
                self.bindings.vertex_buffers.insert(slot, Arc::clone(buffer));
            }
            None => {
                self.bindings.vertex_buffers.remove(&slot);
            }
        }
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: Option<&Arc<dyn Buffer>>, index_type: IndexType, offset: u64) -> Result<()> {
        const OP: &str = "set_index_buffer";
        let inner = self.unwrap_binding::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        self.check_buffer_type(OP, buffer, BufferType::Index)?;
        self.inner.set_index_buffer(inner.as_ref(), index_type, offset)?;
        self.bindings.index_buffer = buffer.map(|buffer| IndexBinding {
            buffer: Arc::clone(buffer),
            index_type,
            offset,
        });
        Ok(())
    }

    fn set_uniform_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()> {
        const OP: &str = "set_uniform_buffer";
        let inner = self.unwrap_binding::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        self.check_buffer_type(OP, buffer, BufferType::Uniform)?;
        self.inner.set_uniform_buffer(slot, inner.as_ref())
    }

    fn set_storage_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn Buffer>>) -> Result<()> {
        const OP: &str = "set_storage_buffer";
        let inner = self.unwrap_binding::<dyn Buffer, ValidatedBuffer>(OP, buffer)?;
        self.check_buffer_type(OP, buffer, BufferType::ShaderStorage)?;
        self.inner.set_storage_buffer(slot, inner.as_ref())
    }

    fn set_framebuffer(&mut self, framebuffer: Option<&Arc<dyn Framebuffer>>) -> Result<()> {
        const OP: &str = "set_framebuffer";
        let inner = self.unwrap_binding::<dyn Framebuffer, ValidatedFramebuffer>(OP, framebuffer)?;
        if let Some(framebuffer) = framebuffer {
            if let Some(attachment) = framebuffer.disposed_attachment() {
                self.check(OP, ViolationKind::DisposedAttachment {
                    framebuffer: framebuffer.label().to_string(),
                    attachment: attachment.label().to_string(),
                })?;
            }
        }
        self.inner.set_framebuffer(inner.as_ref())?;
        self.bindings.framebuffer = framebuffer.cloned();
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        const OP: &str = "set_viewport";
        self.check_alive(OP)?;
        if viewport.width <= 0.0 || viewport.height <= 0.0 || viewport.min_depth > viewport.max_depth {
            self.check(OP, ViolationKind::InvalidDescription {
                label: "viewport".to_string(),
                detail: format!("{:?} is empty or has an inverted depth range", viewport),
            })?;
        }
        self.inner.set_viewport(viewport)
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.check_alive("set_scissor")?;
        self.inner.set_scissor(scissor)
    }

    fn viewport(&self) -> Viewport {
        self.inner.viewport()
    }

    fn scissor(&self) -> Rect2D {
        self.inner.scissor()
    }

    // ===== SUBMISSION =====

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        const OP: &str = "draw";
        self.check_alive(OP)?;
        self.check_shader(OP, false)?;
        self.check_framebuffer(OP)?;
        self.check_vertex_buffers(OP, false)?;
        self.check_count(OP, vertex_count, "vertices")?;
        self.inner.draw(vertex_count, first_vertex)
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) -> Result<()> {
        const OP: &str = "draw_indexed";
        self.check_alive(OP)?;
        self.check_shader(OP, false)?;
        self.check_framebuffer(OP)?;
        self.check_vertex_buffers(OP, true)?;
        self.check_index_range(OP, first_index, index_count)?;
        self.check_count(OP, index_count, "indices")?;
        self.inner.draw_indexed(index_count, first_index, base_vertex)
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        base_vertex: i32,
        first_instance: u32,
    ) -> Result<()> {
        const OP: &str = "draw_indexed_instanced";
        self.check_alive(OP)?;
        self.check_shader(OP, false)?;
        self.check_framebuffer(OP)?;
        self.check_vertex_buffers(OP, true)?;
        self.check_index_range(OP, first_index, index_count)?;
        self.check_count(OP, index_count, "indices")?;
        self.check_count(OP, instance_count, "instances")?;
        self.inner
            .draw_indexed_instanced(index_count, instance_count, first_index, base_vertex, first_instance)
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) -> Result<()> {
        const OP: &str = "dispatch";
        self.check_alive(OP)?;
        self.check_shader(OP, true)?;
        self.check_count(OP, groups_x.min(groups_y).min(groups_z), "work groups")?;
        self.inner.dispatch(groups_x, groups_y, groups_z)
    }

    fn present(&mut self, swap_interval: u32) -> Result<()> {
        const OP: &str = "present";
        self.check_alive(OP)?;
        if swap_interval > MAX_SWAP_INTERVAL {
            self.check(OP, ViolationKind::InvalidSwapInterval { interval: swap_interval })?;
        }
        self.inner.present(swap_interval)
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        const OP: &str = "generate_mipmaps";
        let wrapper = self.unwrap::<dyn Texture, ValidatedTexture>(OP, texture)?;
        let desc = texture.desc();
        if desc.format.is_block_compressed() {
            self.check(OP, ViolationKind::BlockCompressedMipmaps {
                label: desc.label.clone(),
                format: desc.format,
            })?;
        } else if !desc.texture_type.is_mipmappable() {
            self.check(OP, ViolationKind::NotMipmappable {
                label: desc.label.clone(),
                texture_type: desc.texture_type,
            })?;
        } else if desc.mip_levels == 1 {
            self.check(OP, ViolationKind::SingleMipLevel { label: desc.label.clone() })?;
        }
        self.inner.generate_mipmaps(wrapper.inner())
    }

    // ===== LIFETIME =====

    fn swapchain(&self) -> &SwapchainInfo {
        self.inner.swapchain()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        const OP: &str = "resize";
        self.check_alive(OP)?;
        if width == 0 || height == 0 {
            self.check(OP, ViolationKind::InvalidDescription {
                label: "swapchain".to_string(),
                detail: format!("resize to {}x{}", width, height),
            })?;
        }
        self.inner.resize(width, height)
    }

    fn flush(&mut self) -> Result<()> {
        self.check_alive("flush")?;
        self.inner.flush()
    }

    fn stats(&self) -> DeviceStats {
        self.inner.stats()
    }

    fn outstanding_resources(&mut self) -> FxHashMap<ResourceKind, usize> {
        self.registry.live_counts()
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if self.context.config().track_resources {
            let mut outstanding: Vec<_> = self.registry.live_counts().into_iter().collect();
            outstanding.sort_unstable();
            for (kind, count) in outstanding {
                let _ = self.context.report("dispose", ViolationKind::OutstandingResources { kind, count });
            }
        }

        self.registry.dispose_all();
        self.bindings = Bindings::default();
        self.inner.dispose();
        self.disposed = true;

        let stats = self.context.stats();
        engine_info!(LOG_SOURCE, "Validated device #{} disposed ({} errors, {} warnings reported)",
            self.inner.id().raw(), stats.errors, stats.warnings);
    }
}

#[cfg(test)]
#[path = "validated_graphics_device_tests.rs"]
mod tests;
