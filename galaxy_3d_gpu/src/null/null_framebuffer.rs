/// Framebuffer - null implementation of the Framebuffer trait

use crate::error::Result;
use crate::graphics_device::{DeviceId, Framebuffer, FramebufferDesc, ResourceId, ResourceKind};
use super::null_resource::{impl_null_resource, NullResourceHeader};

/// Null framebuffer
pub struct NullFramebuffer {
    pub(crate) header: NullResourceHeader,
    desc: FramebufferDesc,
    width: u32,
    height: u32,
}

impl NullFramebuffer {
    /// Attachments must be present and share one extent
    pub(crate) fn new(id: ResourceId, device_id: DeviceId, desc: &FramebufferDesc) -> Result<Self> {
        let (width, height) = desc.extent()?;
        Ok(Self {
            header: NullResourceHeader::new(id, device_id, &desc.label),
            desc: desc.clone(),
            width,
            height,
        })
    }
}

impl_null_resource!(NullFramebuffer, ResourceKind::Framebuffer);

impl Framebuffer for NullFramebuffer {
    fn desc(&self) -> &FramebufferDesc {
        &self.desc
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
