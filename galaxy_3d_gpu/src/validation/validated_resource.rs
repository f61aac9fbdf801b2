/// Validated resources - one decorator per resource kind
///
/// Each wrapper owns exactly one backend resource and forwards every call
/// to it. Disposal goes through the wrapper so double disposal and
/// disposal of a mapped buffer are reported before reaching the backend.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    BlendState, BlendStateDesc, Buffer, BufferDesc, DepthStencilState, DepthStencilStateDesc,
    DeviceId, Framebuffer, FramebufferDesc, GpuResource, InputLayout, InputLayoutDesc,
    RasterizerState, RasterizerStateDesc, ResourceId, ResourceKind, SamplerState,
    SamplerStateDesc, Shader, ShaderDesc, Texture, TextureDesc,
};
use super::validation_context::ValidationContext;
use super::violation::ViolationKind;

/// Validating decorator around a backend resource
pub struct Validated<T: ?Sized> {
    inner: Arc<T>,
    id: ResourceId,
    context: Arc<ValidationContext>,
    /// Map state as seen by the validating layer (buffers only)
    mapped: AtomicBool,
}

pub type ValidatedBuffer = Validated<dyn Buffer>;
pub type ValidatedTexture = Validated<dyn Texture>;
pub type ValidatedShader = Validated<dyn Shader>;
pub type ValidatedRasterizerState = Validated<dyn RasterizerState>;
pub type ValidatedBlendState = Validated<dyn BlendState>;
pub type ValidatedDepthStencilState = Validated<dyn DepthStencilState>;
pub type ValidatedSamplerState = Validated<dyn SamplerState>;
pub type ValidatedInputLayout = Validated<dyn InputLayout>;

impl<T: ?Sized> Validated<T> {
    pub(crate) fn new(inner: Arc<T>, id: ResourceId, context: Arc<ValidationContext>) -> Self {
        Self {
            inner,
            id,
            context,
            mapped: AtomicBool::new(false),
        }
    }

    /// Backend resource this wrapper forwards to
    pub fn inner(&self) -> &Arc<T> {
        &self.inner
    }

    pub(crate) fn is_mapped_here(&self) -> bool {
        self.mapped.load(Ordering::Acquire)
    }

    pub(crate) fn set_mapped(&self, mapped: bool) {
        self.mapped.store(mapped, Ordering::Release);
    }
}

impl<T: GpuResource + ?Sized + 'static> GpuResource for Validated<T> {
    fn id(&self) -> ResourceId {
        self.id
    }

    fn device_id(&self) -> DeviceId {
        self.context.device_id()
    }

    fn kind(&self) -> ResourceKind {
        self.inner.kind()
    }

    fn label(&self) -> &str {
        self.inner.label()
    }

    fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    fn dispose(&self) {
        if self.inner.is_disposed() {
            let _ = self.context.report("dispose", ViolationKind::DoubleDispose {
                kind: self.kind(),
                label: self.label().to_string(),
            });
            return;
        }
        // An escalated report keeps the mapping and the resource alive
        if self.is_mapped_here() {
            let report = self.context.report("dispose", ViolationKind::DisposeWhileMapped {
                label: self.label().to_string(),
            });
            if report.is_err() {
                return;
            }
            self.set_mapped(false);
        }
        self.inner.dispose();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Buffer for ValidatedBuffer {
    fn desc(&self) -> &BufferDesc {
        self.inner.desc()
    }

    fn is_mapped(&self) -> bool {
        self.inner.is_mapped()
    }
}

impl Texture for ValidatedTexture {
    fn desc(&self) -> &TextureDesc {
        self.inner.desc()
    }

    fn size_in_bytes(&self) -> u64 {
        self.inner.size_in_bytes()
    }

    fn read_data(&self) -> Result<Vec<u8>> {
        if self.inner.is_disposed() {
            self.context.report("read_data", ViolationKind::DisposedResource {
                kind: ResourceKind::Texture,
                label: self.label().to_string(),
            })?;
        }
        self.inner.read_data()
    }
}

impl Shader for ValidatedShader {
    fn desc(&self) -> &ShaderDesc {
        self.inner.desc()
    }
}

impl RasterizerState for ValidatedRasterizerState {
    fn desc(&self) -> &RasterizerStateDesc {
        self.inner.desc()
    }
}

impl BlendState for ValidatedBlendState {
    fn desc(&self) -> &BlendStateDesc {
        self.inner.desc()
    }
}

impl DepthStencilState for ValidatedDepthStencilState {
    fn desc(&self) -> &DepthStencilStateDesc {
        self.inner.desc()
    }
}

impl SamplerState for ValidatedSamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        self.inner.desc()
    }
}

impl InputLayout for ValidatedInputLayout {
    fn desc(&self) -> &InputLayoutDesc {
        self.inner.desc()
    }
}

/// Validated framebuffer
///
/// Keeps the caller's description (validated attachments) while the backend
/// framebuffer was built from the backend attachments.
pub struct ValidatedFramebuffer {
    base: Validated<dyn Framebuffer>,
    desc: FramebufferDesc,
}

impl ValidatedFramebuffer {
    pub(crate) fn new(
        inner: Arc<dyn Framebuffer>,
        id: ResourceId,
        context: Arc<ValidationContext>,
        desc: FramebufferDesc,
    ) -> Self {
        Self {
            base: Validated::new(inner, id, context),
            desc,
        }
    }
}

impl GpuResource for ValidatedFramebuffer {
    fn id(&self) -> ResourceId {
        self.base.id()
    }

    fn device_id(&self) -> DeviceId {
        self.base.device_id()
    }

    fn kind(&self) -> ResourceKind {
        ResourceKind::Framebuffer
    }

    fn label(&self) -> &str {
        self.base.label()
    }

    fn is_disposed(&self) -> bool {
        self.base.is_disposed()
    }

    fn dispose(&self) {
        self.base.dispose();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Framebuffer for ValidatedFramebuffer {
    fn desc(&self) -> &FramebufferDesc {
        &self.desc
    }

    fn width(&self) -> u32 {
        self.base.inner.width()
    }

    fn height(&self) -> u32 {
        self.base.inner.height()
    }
}

/// Access to the decorator behind a validated resource of any shape
pub(crate) trait Wrapped<T: ?Sized> {
    fn wrapped(&self) -> &Validated<T>;
}

impl<T: ?Sized> Wrapped<T> for Validated<T> {
    fn wrapped(&self) -> &Validated<T> {
        self
    }
}

impl Wrapped<dyn Framebuffer> for ValidatedFramebuffer {
    fn wrapped(&self) -> &Validated<dyn Framebuffer> {
        &self.base
    }
}
