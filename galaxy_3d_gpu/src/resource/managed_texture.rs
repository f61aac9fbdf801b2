//! Resource-level texture type.
//!
//! `ManagedTexture` uploads a texture from one contiguous region or from
//! separately supplied layers/faces (combined before upload), and keeps
//! track of whether it has been unloaded.

use std::sync::Arc;
use crate::{engine_bail, engine_debug};
use crate::error::Result;
use crate::format;
use crate::graphics_device::{GpuResource, GraphicsDevice, Texture, TextureDesc, TextureRegion};

const LOG_SOURCE: &str = "galaxy3d::resource";

/// GPU-resident texture owned by a consumer
pub struct ManagedTexture {
    texture: Arc<dyn Texture>,
    unloaded: bool,
}

impl ManagedTexture {
    /// Create the texture and upload its base level
    ///
    /// # Arguments
    ///
    /// * `layers` - Base-level data. Empty for an uninitialized texture, one
    ///   entry holding every layer already flattened, or one entry per layer
    ///   (and per face for cubemaps) in layer order.
    pub fn upload(device: &mut dyn GraphicsDevice, desc: &TextureDesc, layers: &[&[u8]]) -> Result<Self> {
        let layer_count = desc.layer_count() as usize;
        let texture = match layers {
            [] => device.create_texture(desc, None)?,
            [data] => device.create_texture(desc, Some(*data))?,
            parts if parts.len() == layer_count => {
                let combined = format::combine(parts);
                device.create_texture(desc, Some(&combined))?
            }
            parts => {
                engine_bail!(LOG_SOURCE, "Texture '{}': {} layers supplied, texture has {}",
                    desc.label, parts.len(), layer_count);
            }
        };

        engine_debug!(LOG_SOURCE, "Texture '{}' uploaded ({}x{}, {:?}, {} bytes)",
            desc.label, desc.width, desc.height, desc.format, texture.size_in_bytes());

        Ok(Self {
            texture,
            unloaded: false,
        })
    }

    pub fn label(&self) -> &str {
        self.texture.label()
    }

    pub fn desc(&self) -> &TextureDesc {
        self.texture.desc()
    }

    /// Device-side size of the texture in bytes
    pub fn size_in_bytes(&self) -> u64 {
        self.texture.size_in_bytes()
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    fn ensure_loaded(&self, operation: &str) -> Result<()> {
        if self.unloaded {
            engine_bail!(LOG_SOURCE, "Texture '{}': {} after unload", self.label(), operation);
        }
        Ok(())
    }

    /// Overwrite a region of the texture in place
    pub fn update(&self, device: &mut dyn GraphicsDevice, region: &TextureRegion, data: &[u8]) -> Result<()> {
        self.ensure_loaded("update")?;
        device.update_texture(&self.texture, region, data)
    }

    /// Overwrite the whole base level of one layer
    pub fn update_layer(&self, device: &mut dyn GraphicsDevice, layer: u32, data: &[u8]) -> Result<()> {
        let region = TextureRegion::full(self.texture.desc(), 0, layer);
        self.update(device, &region, data)
    }

    /// Regenerate mip levels 1.. from the base level
    pub fn generate_mipmaps(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_loaded("generate_mipmaps")?;
        device.generate_mipmaps(&self.texture)
    }

    /// Bind to a texture slot
    pub fn bind(&self, device: &mut dyn GraphicsDevice, slot: u32) -> Result<()> {
        self.ensure_loaded("bind")?;
        device.set_texture(slot, Some(&self.texture))
    }

    /// Dispose the texture; a second call is an error
    pub fn unload(&mut self) -> Result<()> {
        if self.unloaded {
            engine_bail!(LOG_SOURCE, "Texture '{}' already unloaded", self.label());
        }
        self.texture.dispose();
        self.unloaded = true;
        engine_debug!(LOG_SOURCE, "Texture '{}' unloaded", self.label());
        Ok(())
    }
}

#[cfg(test)]
#[path = "managed_texture_tests.rs"]
mod tests;
