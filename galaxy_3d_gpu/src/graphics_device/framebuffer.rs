/// Framebuffer trait - groups texture attachments for rendering
///
/// Attachments must stay alive (not disposed) for as long as the
/// framebuffer is in use.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::graphics_device::{GpuResource, Texture};

/// Descriptor for creating a framebuffer
#[derive(Clone)]
pub struct FramebufferDesc {
    /// Debug label
    pub label: String,
    /// Color attachments, in output order
    pub color_attachments: Vec<Arc<dyn Texture>>,
    /// Optional depth/stencil attachment
    pub depth_stencil_attachment: Option<Arc<dyn Texture>>,
}

impl FramebufferDesc {
    /// All attachments, colors first
    pub fn attachments(&self) -> impl Iterator<Item = &Arc<dyn Texture>> {
        self.color_attachments
            .iter()
            .chain(self.depth_stencil_attachment.iter())
    }

    /// Common base-level extent of the attachments
    ///
    /// # Errors
    ///
    /// Fails when there is no attachment or when attachment sizes differ.
    pub fn extent(&self) -> Result<(u32, u32)> {
        let mut attachments = self.attachments();
        let first = attachments.next().ok_or_else(|| {
            Error::InvalidResource(format!("framebuffer '{}' has no attachments", self.label))
        })?;
        let extent = (first.desc().width, first.desc().height);
        for attachment in attachments {
            let other = (attachment.desc().width, attachment.desc().height);
            if other != extent {
                return Err(Error::InvalidResource(format!(
                    "framebuffer '{}': attachment '{}' is {}x{}, expected {}x{}",
                    self.label,
                    attachment.label(),
                    other.0,
                    other.1,
                    extent.0,
                    extent.1
                )));
            }
        }
        Ok(extent)
    }
}

/// Framebuffer resource trait
pub trait Framebuffer: GpuResource {
    /// Creation descriptor (holds the attachments)
    fn desc(&self) -> &FramebufferDesc;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// First attachment that was disposed behind the framebuffer's back
    fn disposed_attachment(&self) -> Option<&Arc<dyn Texture>> {
        self.desc().attachments().find(|texture| texture.is_disposed())
    }
}
