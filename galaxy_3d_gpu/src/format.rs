//! Pixel formats and texture layout arithmetic
//!
//! Pure functions with no device dependency. Block-compressed formats are
//! always measured in whole 4x4 texel blocks, linear formats in texels.

use crate::error::{Error, Result};

/// Edge length, in texels, of a block-compressed block
pub const BLOCK_DIMENSION: u32 = 4;

/// Texture pixel format
///
/// The raw discriminant is the value stored by asset files and passed
/// through `TextureFormat::from_raw`. `Unknown` is never a valid format
/// for a resource; every layout query on it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
#[repr(u32)]
pub enum TextureFormat {
    Unknown = 0,

    // 8-bit
    R8_UNORM = 1,
    R8_SNORM = 2,
    R8_UINT = 3,
    R8_SINT = 4,

    // 16-bit
    R8G8_UNORM = 10,
    R8G8_SNORM = 11,
    R8G8_UINT = 12,
    R8G8_SINT = 13,
    R16_UNORM = 14,
    R16_SNORM = 15,
    R16_UINT = 16,
    R16_SINT = 17,
    R16_FLOAT = 18,
    B5G6R5_UNORM = 19,
    B5G5R5A1_UNORM = 20,
    D16_UNORM = 21,

    // 32-bit
    R8G8B8A8_UNORM = 30,
    R8G8B8A8_SRGB = 31,
    R8G8B8A8_SNORM = 32,
    R8G8B8A8_UINT = 33,
    R8G8B8A8_SINT = 34,
    B8G8R8A8_UNORM = 35,
    B8G8R8A8_SRGB = 36,
    R10G10B10A2_UNORM = 37,
    R10G10B10A2_UINT = 38,
    R11G11B10_FLOAT = 39,
    R16G16_UNORM = 40,
    R16G16_SNORM = 41,
    R16G16_UINT = 42,
    R16G16_SINT = 43,
    R16G16_FLOAT = 44,
    R32_UINT = 45,
    R32_SINT = 46,
    R32_FLOAT = 47,
    D32_FLOAT = 48,
    D24_UNORM_S8_UINT = 49,

    // 64-bit
    R16G16B16A16_UNORM = 60,
    R16G16B16A16_SNORM = 61,
    R16G16B16A16_UINT = 62,
    R16G16B16A16_SINT = 63,
    R16G16B16A16_FLOAT = 64,
    R32G32_UINT = 65,
    R32G32_SINT = 66,
    R32G32_FLOAT = 67,
    D32_FLOAT_S8X24_UINT = 68,

    // 96-bit
    R32G32B32_UINT = 80,
    R32G32B32_SINT = 81,
    R32G32B32_FLOAT = 82,

    // 128-bit
    R32G32B32A32_UINT = 90,
    R32G32B32A32_SINT = 91,
    R32G32B32A32_FLOAT = 92,

    // Block-compressed, 8-byte blocks
    BC1_UNORM = 100,
    BC1_SRGB = 101,
    BC4_UNORM = 102,
    BC4_SNORM = 103,

    // Block-compressed, 16-byte blocks
    BC2_UNORM = 110,
    BC2_SRGB = 111,
    BC3_UNORM = 112,
    BC3_SRGB = 113,
    BC5_UNORM = 114,
    BC5_SNORM = 115,
    BC6H_UF16 = 116,
    BC6H_SF16 = 117,
    BC7_UNORM = 118,
    BC7_SRGB = 119,
}

impl TextureFormat {
    /// Every format a resource may be created with (`Unknown` excluded)
    pub const ALL: &'static [TextureFormat] = &[
        TextureFormat::R8_UNORM,
        TextureFormat::R8_SNORM,
        TextureFormat::R8_UINT,
        TextureFormat::R8_SINT,
        TextureFormat::R8G8_UNORM,
        TextureFormat::R8G8_SNORM,
        TextureFormat::R8G8_UINT,
        TextureFormat::R8G8_SINT,
        TextureFormat::R16_UNORM,
        TextureFormat::R16_SNORM,
        TextureFormat::R16_UINT,
        TextureFormat::R16_SINT,
        TextureFormat::R16_FLOAT,
        TextureFormat::B5G6R5_UNORM,
        TextureFormat::B5G5R5A1_UNORM,
        TextureFormat::D16_UNORM,
        TextureFormat::R8G8B8A8_UNORM,
        TextureFormat::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_SNORM,
        TextureFormat::R8G8B8A8_UINT,
        TextureFormat::R8G8B8A8_SINT,
        TextureFormat::B8G8R8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB,
        TextureFormat::R10G10B10A2_UNORM,
        TextureFormat::R10G10B10A2_UINT,
        TextureFormat::R11G11B10_FLOAT,
        TextureFormat::R16G16_UNORM,
        TextureFormat::R16G16_SNORM,
        TextureFormat::R16G16_UINT,
        TextureFormat::R16G16_SINT,
        TextureFormat::R16G16_FLOAT,
        TextureFormat::R32_UINT,
        TextureFormat::R32_SINT,
        TextureFormat::R32_FLOAT,
        TextureFormat::D32_FLOAT,
        TextureFormat::D24_UNORM_S8_UINT,
        TextureFormat::R16G16B16A16_UNORM,
        TextureFormat::R16G16B16A16_SNORM,
        TextureFormat::R16G16B16A16_UINT,
        TextureFormat::R16G16B16A16_SINT,
        TextureFormat::R16G16B16A16_FLOAT,
        TextureFormat::R32G32_UINT,
        TextureFormat::R32G32_SINT,
        TextureFormat::R32G32_FLOAT,
        TextureFormat::D32_FLOAT_S8X24_UINT,
        TextureFormat::R32G32B32_UINT,
        TextureFormat::R32G32B32_SINT,
        TextureFormat::R32G32B32_FLOAT,
        TextureFormat::R32G32B32A32_UINT,
        TextureFormat::R32G32B32A32_SINT,
        TextureFormat::R32G32B32A32_FLOAT,
        TextureFormat::BC1_UNORM,
        TextureFormat::BC1_SRGB,
        TextureFormat::BC4_UNORM,
        TextureFormat::BC4_SNORM,
        TextureFormat::BC2_UNORM,
        TextureFormat::BC2_SRGB,
        TextureFormat::BC3_UNORM,
        TextureFormat::BC3_SRGB,
        TextureFormat::BC5_UNORM,
        TextureFormat::BC5_SNORM,
        TextureFormat::BC6H_UF16,
        TextureFormat::BC6H_SF16,
        TextureFormat::BC7_UNORM,
        TextureFormat::BC7_SRGB,
    ];

    /// Look up a format from its raw discriminant
    ///
    /// # Errors
    ///
    /// `Error::UnsupportedFormat` for any value outside the table, including 0 (`Unknown`).
    pub fn from_raw(raw: u32) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| *format as u32 == raw)
            .ok_or_else(|| Error::UnsupportedFormat(format!("unrecognized raw format value {}", raw)))
    }

    /// Byte size of one 4x4 block, or `None` for linear formats
    pub fn block_size_bytes(&self) -> Option<u32> {
        match self {
            TextureFormat::BC1_UNORM
            | TextureFormat::BC1_SRGB
            | TextureFormat::BC4_UNORM
            | TextureFormat::BC4_SNORM => Some(8),

            TextureFormat::BC2_UNORM
            | TextureFormat::BC2_SRGB
            | TextureFormat::BC3_UNORM
            | TextureFormat::BC3_SRGB
            | TextureFormat::BC5_UNORM
            | TextureFormat::BC5_SNORM
            | TextureFormat::BC6H_UF16
            | TextureFormat::BC6H_SF16
            | TextureFormat::BC7_UNORM
            | TextureFormat::BC7_SRGB => Some(16),

            _ => None,
        }
    }

    /// Returns true for block-compressed (BCn) formats
    pub fn is_block_compressed(&self) -> bool {
        self.block_size_bytes().is_some()
    }

    /// Returns true for depth (and depth/stencil) formats
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM
                | TextureFormat::D32_FLOAT
                | TextureFormat::D24_UNORM_S8_UINT
                | TextureFormat::D32_FLOAT_S8X24_UINT
        )
    }

    /// Returns true for formats carrying a stencil aspect
    pub fn has_stencil(&self) -> bool {
        matches!(
            self,
            TextureFormat::D24_UNORM_S8_UINT | TextureFormat::D32_FLOAT_S8X24_UINT
        )
    }

    /// Returns true for sRGB-encoded color formats
    pub fn is_srgb(&self) -> bool {
        matches!(
            self,
            TextureFormat::R8G8B8A8_SRGB
                | TextureFormat::B8G8R8A8_SRGB
                | TextureFormat::BC1_SRGB
                | TextureFormat::BC2_SRGB
                | TextureFormat::BC3_SRGB
                | TextureFormat::BC7_SRGB
        )
    }
}

/// Bit width of one texel (average over a 4x4 block for BCn formats)
///
/// # Errors
///
/// `Error::UnsupportedFormat` for `TextureFormat::Unknown`. There is no default width.
pub fn bits_per_pixel(format: TextureFormat) -> Result<u32> {
    let bits = match format {
        TextureFormat::Unknown => {
            return Err(Error::UnsupportedFormat(
                "bits_per_pixel: format Unknown has no bit width".to_string(),
            ))
        }

        TextureFormat::R8_UNORM
        | TextureFormat::R8_SNORM
        | TextureFormat::R8_UINT
        | TextureFormat::R8_SINT => 8,

        TextureFormat::R8G8_UNORM
        | TextureFormat::R8G8_SNORM
        | TextureFormat::R8G8_UINT
        | TextureFormat::R8G8_SINT
        | TextureFormat::R16_UNORM
        | TextureFormat::R16_SNORM
        | TextureFormat::R16_UINT
        | TextureFormat::R16_SINT
        | TextureFormat::R16_FLOAT
        | TextureFormat::B5G6R5_UNORM
        | TextureFormat::B5G5R5A1_UNORM
        | TextureFormat::D16_UNORM => 16,

        TextureFormat::R8G8B8A8_UNORM
        | TextureFormat::R8G8B8A8_SRGB
        | TextureFormat::R8G8B8A8_SNORM
        | TextureFormat::R8G8B8A8_UINT
        | TextureFormat::R8G8B8A8_SINT
        | TextureFormat::B8G8R8A8_UNORM
        | TextureFormat::B8G8R8A8_SRGB
        | TextureFormat::R10G10B10A2_UNORM
        | TextureFormat::R10G10B10A2_UINT
        | TextureFormat::R11G11B10_FLOAT
        | TextureFormat::R16G16_UNORM
        | TextureFormat::R16G16_SNORM
        | TextureFormat::R16G16_UINT
        | TextureFormat::R16G16_SINT
        | TextureFormat::R16G16_FLOAT
        | TextureFormat::R32_UINT
        | TextureFormat::R32_SINT
        | TextureFormat::R32_FLOAT
        | TextureFormat::D32_FLOAT
        | TextureFormat::D24_UNORM_S8_UINT => 32,

        TextureFormat::R16G16B16A16_UNORM
        | TextureFormat::R16G16B16A16_SNORM
        | TextureFormat::R16G16B16A16_UINT
        | TextureFormat::R16G16B16A16_SINT
        | TextureFormat::R16G16B16A16_FLOAT
        | TextureFormat::R32G32_UINT
        | TextureFormat::R32G32_SINT
        | TextureFormat::R32G32_FLOAT
        | TextureFormat::D32_FLOAT_S8X24_UINT => 64,

        TextureFormat::R32G32B32_UINT
        | TextureFormat::R32G32B32_SINT
        | TextureFormat::R32G32B32_FLOAT => 96,

        TextureFormat::R32G32B32A32_UINT
        | TextureFormat::R32G32B32A32_SINT
        | TextureFormat::R32G32B32A32_FLOAT => 128,

        TextureFormat::BC1_UNORM
        | TextureFormat::BC1_SRGB
        | TextureFormat::BC4_UNORM
        | TextureFormat::BC4_SNORM => 4,

        TextureFormat::BC2_UNORM
        | TextureFormat::BC2_SRGB
        | TextureFormat::BC3_UNORM
        | TextureFormat::BC3_SRGB
        | TextureFormat::BC5_UNORM
        | TextureFormat::BC5_SNORM
        | TextureFormat::BC6H_UF16
        | TextureFormat::BC6H_SF16
        | TextureFormat::BC7_UNORM
        | TextureFormat::BC7_SRGB => 8,
    };
    Ok(bits)
}

/// Byte stride between consecutive rows of texel data
///
/// Block formats: `max(1, ceil(width / 4)) * block_bytes` (one row of blocks).
/// Linear formats: `ceil(width * bits_per_pixel / 8)`.
pub fn calculate_row_pitch(format: TextureFormat, width: u32) -> Result<u32> {
    if let Some(block_bytes) = format.block_size_bytes() {
        let blocks_wide = width.div_ceil(BLOCK_DIMENSION).max(1);
        return blocks_wide
            .checked_mul(block_bytes)
            .ok_or_else(|| Error::InvalidResource(format!("row pitch overflow for width {}", width)));
    }

    let bits = bits_per_pixel(format)? as u64;
    let pitch = (width as u64 * bits).div_ceil(8);
    u32::try_from(pitch)
        .map_err(|_| Error::InvalidResource(format!("row pitch overflow for width {}", width)))
}

/// Number of pitch rows covering `height` texels (block rows for BCn formats)
pub fn calculate_row_count(format: TextureFormat, height: u32) -> u32 {
    if format.is_block_compressed() {
        height.div_ceil(BLOCK_DIMENSION).max(1)
    } else {
        height
    }
}

/// Byte size of one 2D slice (`row_pitch * row_count`)
pub fn calculate_slice_pitch(format: TextureFormat, width: u32, height: u32) -> Result<u64> {
    let row_pitch = calculate_row_pitch(format, width)? as u64;
    Ok(row_pitch * calculate_row_count(format, height) as u64)
}

/// Full mip chain length for base dimensions: `floor(log2(max(w, h, d))) + 1`
///
/// The dimensions are taken to be the base level; this is not verified.
pub fn calculate_mip_levels(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Extent of a mip level along one axis (never below 1)
pub fn mip_dimension(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

/// Concatenate separately supplied layers/faces into one contiguous region
///
/// Input order is preserved; used to pre-flatten array and cubemap data
/// before `create_texture`.
pub fn combine<T: AsRef<[u8]>>(parts: &[T]) -> Vec<u8> {
    let total: usize = parts.iter().map(|part| part.as_ref().len()).sum();
    let mut combined = Vec::with_capacity(total);
    for part in parts {
        combined.extend_from_slice(part.as_ref());
    }
    combined
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
