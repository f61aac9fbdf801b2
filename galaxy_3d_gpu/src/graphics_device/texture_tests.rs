//! Unit tests for texture.rs

use super::*;

// ============================================================================
// TEXTURE TYPE / USAGE
// ============================================================================

#[test]
fn test_mipmappable_types() {
    assert!(TextureType::Tex1D.is_mipmappable());
    assert!(TextureType::Tex2D.is_mipmappable());
    assert!(TextureType::Tex3D.is_mipmappable());
    assert!(TextureType::Cube.is_mipmappable());
    assert!(!TextureType::Tex2DMultisample.is_mipmappable());
}

#[test]
fn test_usage_flags_combine() {
    let usage = TextureUsage::SAMPLED | TextureUsage::RENDER_TARGET;
    assert!(usage.contains(TextureUsage::RENDER_TARGET));
    assert!(!usage.contains(TextureUsage::DEPTH_STENCIL));
}

// ============================================================================
// DESCRIPTOR SIZES
// ============================================================================

#[test]
fn test_data_size_rgba_2d() {
    let desc = TextureDesc::new_2d("albedo", 64, 64, TextureFormat::R8G8B8A8_UNORM);
    assert_eq!(desc.data_size().unwrap(), 64 * 64 * 4);
}

#[test]
fn test_data_size_block_compressed_uses_block_pitch() {
    // 10x10 BC1 => 3x3 blocks of 8 bytes
    let desc = TextureDesc::new_2d("bc1", 10, 10, TextureFormat::BC1_UNORM);
    assert_eq!(desc.data_size().unwrap(), 3 * 3 * 8);
}

#[test]
fn test_data_size_cube_array() {
    let desc = TextureDesc::new_cube("sky", 16, TextureFormat::R8G8B8A8_UNORM).with_array_layers(2);
    assert_eq!(desc.layer_count(), 12);
    assert_eq!(desc.data_size().unwrap(), 12 * 16 * 16 * 4);
}

#[test]
fn test_data_size_3d() {
    let mut desc = TextureDesc::new_2d("volume", 8, 8, TextureFormat::R8_UNORM);
    desc.texture_type = TextureType::Tex3D;
    desc.depth = 4;
    assert_eq!(desc.data_size().unwrap(), 8 * 8 * 4);
    assert_eq!(desc.layer_size(1).unwrap(), 4 * 4 * 2);
}

#[test]
fn test_full_mip_chain() {
    let desc = TextureDesc::new_2d("chain", 300, 150, TextureFormat::R8_UNORM).with_full_mip_chain();
    assert_eq!(desc.mip_levels, 9);
}

// ============================================================================
// DESCRIPTOR CHECKS
// ============================================================================

#[test]
fn test_check_accepts_valid_desc() {
    let desc = TextureDesc::new_2d("ok", 32, 32, TextureFormat::BC7_UNORM).with_full_mip_chain();
    assert!(desc.check().is_ok());
}

#[test]
fn test_check_rejects_unknown_format() {
    let desc = TextureDesc::new_2d("bad", 32, 32, TextureFormat::Unknown);
    assert!(matches!(desc.check(), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_check_rejects_zero_dimensions_and_mips() {
    assert!(TextureDesc::new_2d("w0", 0, 32, TextureFormat::R8_UNORM).check().is_err());
    assert!(TextureDesc::new_2d("m0", 32, 32, TextureFormat::R8_UNORM).with_mip_levels(0).check().is_err());
    assert!(TextureDesc::new_2d("m7", 32, 32, TextureFormat::R8_UNORM).with_mip_levels(7).check().is_err());
}

#[test]
fn test_check_rejects_non_square_cube() {
    let mut desc = TextureDesc::new_cube("cube", 16, TextureFormat::R8_UNORM);
    desc.height = 8;
    assert!(desc.check().is_err());
}

#[test]
fn test_check_rejects_multisample_mips() {
    let mut desc = TextureDesc::new_2d("msaa", 16, 16, TextureFormat::R8G8B8A8_UNORM).with_mip_levels(2);
    desc.texture_type = TextureType::Tex2DMultisample;
    assert!(desc.check().is_err());
}

// ============================================================================
// REGIONS
// ============================================================================

#[test]
fn test_full_region() {
    let desc = TextureDesc::new_2d("t", 64, 32, TextureFormat::R8G8B8A8_UNORM).with_mip_levels(3);
    let region = TextureRegion::full(&desc, 2, 0);
    assert_eq!((region.width, region.height, region.depth), (16, 8, 1));
    assert_eq!(region.data_size(desc.format).unwrap(), 16 * 8 * 4);
    assert!(region.check_bounds(&desc).is_ok());
}

#[test]
fn test_region_out_of_bounds() {
    let desc = TextureDesc::new_2d("t", 16, 16, TextureFormat::R8G8B8A8_UNORM);
    let mut region = TextureRegion::full(&desc, 0, 0);
    region.x = 8;
    assert!(region.check_bounds(&desc).is_err());

    let region = TextureRegion::full(&desc, 1, 0);
    assert!(region.check_bounds(&desc).is_err());

    let region = TextureRegion::full(&desc, 0, 1);
    assert!(region.check_bounds(&desc).is_err());
}

#[test]
fn test_region_block_alignment() {
    let desc = TextureDesc::new_2d("bc", 16, 16, TextureFormat::BC3_UNORM);
    let mut region = TextureRegion::full(&desc, 0, 0);
    region.x = 4;
    region.width = 8;
    assert!(region.check_bounds(&desc).is_ok());

    region.x = 2;
    assert!(region.check_bounds(&desc).is_err());
}
