/// Texture trait, texture descriptor and update regions

use bitflags::bitflags;
use crate::error::{Error, Result};
use crate::format::{self, TextureFormat};
use crate::graphics_device::GpuResource;

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Tex1D,
    Tex2D,
    Tex3D,
    /// Six square faces per array layer
    Cube,
    /// Multisampled 2D render target (single mip level)
    Tex2DMultisample,
}

impl TextureType {
    /// Returns true if a mip chain can be generated for this type
    pub fn is_mipmappable(&self) -> bool {
        matches!(
            self,
            TextureType::Tex1D | TextureType::Tex2D | TextureType::Tex3D | TextureType::Cube
        )
    }

    /// Number of 2D faces per array layer
    pub fn faces_per_layer(&self) -> u32 {
        match self {
            TextureType::Cube => 6,
            _ => 1,
        }
    }
}

bitflags! {
    /// Ways a texture may be bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Can be sampled in shaders
        const SAMPLED = 1 << 0;
        /// Can be a color attachment
        const RENDER_TARGET = 1 << 1;
        /// Can be a depth/stencil attachment
        const DEPTH_STENCIL = 1 << 2;
        /// Can be bound for unordered shader access
        const STORAGE = 1 << 3;
    }
}

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    /// Debug label
    pub label: String,
    /// Dimensionality
    pub texture_type: TextureType,
    /// Width in texels
    pub width: u32,
    /// Height in texels (1 for 1D)
    pub height: u32,
    /// Depth in texels (1 unless 3D)
    pub depth: u32,
    /// Number of array layers (cube textures: number of cubes)
    pub array_layers: u32,
    /// Number of mip levels, base level included
    pub mip_levels: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage flags
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Sampled 2D texture with a single mip level
    pub fn new_2d(label: impl Into<String>, width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            label: label.into(),
            texture_type: TextureType::Tex2D,
            width,
            height,
            depth: 1,
            array_layers: 1,
            mip_levels: 1,
            format,
            usage: TextureUsage::SAMPLED,
        }
    }

    /// Sampled cubemap with a single mip level
    pub fn new_cube(label: impl Into<String>, size: u32, format: TextureFormat) -> Self {
        Self {
            texture_type: TextureType::Cube,
            ..Self::new_2d(label, size, size, format)
        }
    }

    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_array_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    pub fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Request the complete mip chain for the base dimensions
    pub fn with_full_mip_chain(mut self) -> Self {
        self.mip_levels = self.max_mip_levels();
        self
    }

    /// Longest legal mip chain for the base dimensions
    pub fn max_mip_levels(&self) -> u32 {
        format::calculate_mip_levels(self.width, self.height, self.depth)
    }

    /// Total 2D layers (array layers times faces)
    pub fn layer_count(&self) -> u32 {
        self.array_layers * self.texture_type.faces_per_layer()
    }

    /// Byte size of one layer of `mip_level`
    pub fn layer_size(&self, mip_level: u32) -> Result<u64> {
        let width = format::mip_dimension(self.width, mip_level);
        let height = format::mip_dimension(self.height, mip_level);
        let depth = format::mip_dimension(self.depth, mip_level);
        Ok(format::calculate_slice_pitch(self.format, width, height)? * depth as u64)
    }

    /// Byte length of the initial data for this texture
    ///
    /// Covers the base mip level of every layer and face, laid out layer
    /// after layer (see `format::combine`).
    pub fn data_size(&self) -> Result<u64> {
        Ok(self.layer_size(0)? * self.layer_count() as u64)
    }

    /// Check the description is complete and self-consistent
    pub fn check(&self) -> Result<()> {
        if self.format == TextureFormat::Unknown {
            return Err(Error::UnsupportedFormat(format!(
                "texture '{}' has format Unknown",
                self.label
            )));
        }
        if self.width == 0 || self.height == 0 || self.depth == 0 || self.array_layers == 0 {
            return Err(Error::InvalidResource(format!(
                "texture '{}' has a zero dimension ({}x{}x{}, {} layers)",
                self.label, self.width, self.height, self.depth, self.array_layers
            )));
        }
        if self.mip_levels == 0 || self.mip_levels > self.max_mip_levels() {
            return Err(Error::InvalidResource(format!(
                "texture '{}' requests {} mip levels (valid: 1..={})",
                self.label,
                self.mip_levels,
                self.max_mip_levels()
            )));
        }
        match self.texture_type {
            TextureType::Tex1D if self.height != 1 || self.depth != 1 => Err(Error::InvalidResource(
                format!("1D texture '{}' must have height and depth 1", self.label),
            )),
            TextureType::Tex2D | TextureType::Tex2DMultisample if self.depth != 1 => {
                Err(Error::InvalidResource(format!(
                    "2D texture '{}' must have depth 1",
                    self.label
                )))
            }
            TextureType::Tex3D if self.array_layers != 1 => Err(Error::InvalidResource(format!(
                "3D texture '{}' cannot be an array",
                self.label
            ))),
            TextureType::Cube if self.width != self.height || self.depth != 1 => {
                Err(Error::InvalidResource(format!(
                    "cube texture '{}' faces must be square with depth 1",
                    self.label
                )))
            }
            TextureType::Tex2DMultisample if self.mip_levels != 1 => Err(Error::InvalidResource(
                format!("multisample texture '{}' must have one mip level", self.label),
            )),
            _ => Ok(()),
        }
    }
}

/// Destination region of a texture update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRegion {
    pub mip_level: u32,
    /// Flattened layer index (array layer * faces + face)
    pub layer: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl TextureRegion {
    /// Whole extent of one layer at `mip_level`
    pub fn full(desc: &TextureDesc, mip_level: u32, layer: u32) -> Self {
        Self {
            mip_level,
            layer,
            x: 0,
            y: 0,
            z: 0,
            width: format::mip_dimension(desc.width, mip_level),
            height: format::mip_dimension(desc.height, mip_level),
            depth: format::mip_dimension(desc.depth, mip_level),
        }
    }

    /// Byte length of tightly packed data for this region in `format`
    pub fn data_size(&self, format: TextureFormat) -> Result<u64> {
        Ok(format::calculate_slice_pitch(format, self.width, self.height)? * self.depth as u64)
    }

    /// Check the region lies inside the texture and respects block alignment
    pub fn check_bounds(&self, desc: &TextureDesc) -> Result<()> {
        if self.mip_level >= desc.mip_levels {
            return Err(Error::InvalidResource(format!(
                "mip level {} out of range (texture has {})",
                self.mip_level, desc.mip_levels
            )));
        }
        if self.layer >= desc.layer_count() {
            return Err(Error::InvalidResource(format!(
                "layer {} out of range (texture has {})",
                self.layer,
                desc.layer_count()
            )));
        }
        let full = TextureRegion::full(desc, self.mip_level, self.layer);
        let fits = |offset: u32, extent: u32, limit: u32| {
            extent > 0 && offset.checked_add(extent).is_some_and(|end| end <= limit)
        };
        if !fits(self.x, self.width, full.width)
            || !fits(self.y, self.height, full.height)
            || !fits(self.z, self.depth, full.depth)
        {
            return Err(Error::InvalidResource(format!(
                "region {}x{}x{} at ({}, {}, {}) exceeds mip {} extent {}x{}x{}",
                self.width, self.height, self.depth, self.x, self.y, self.z,
                self.mip_level, full.width, full.height, full.depth
            )));
        }
        if desc.format.is_block_compressed() {
            let block = format::BLOCK_DIMENSION;
            let edge_ok = |offset: u32, extent: u32, limit: u32| {
                offset % block == 0 && (extent % block == 0 || offset + extent == limit)
            };
            if !edge_ok(self.x, self.width, full.width) || !edge_ok(self.y, self.height, full.height) {
                return Err(Error::InvalidResource(format!(
                    "region at ({}, {}) size {}x{} is not aligned to {}x{} blocks",
                    self.x, self.y, self.width, self.height, block, block
                )));
            }
        }
        Ok(())
    }
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
pub trait Texture: GpuResource {
    /// Creation descriptor
    fn desc(&self) -> &TextureDesc;

    /// Byte length of the base level across all layers (`TextureDesc::data_size`)
    fn size_in_bytes(&self) -> u64;

    /// Read back the base level across all layers
    fn read_data(&self) -> Result<Vec<u8>>;
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
