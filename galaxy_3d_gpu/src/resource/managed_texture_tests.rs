//! Unit tests for managed_texture.rs

use super::*;
use crate::error::Error;
use crate::format::{calculate_mip_levels, TextureFormat};
use crate::graphics_device::{Config, GraphicsDevice};
use crate::null::NullGraphicsDevice;

fn device() -> NullGraphicsDevice {
    NullGraphicsDevice::new(&Config::default())
}

#[test]
fn test_upload_64x64_rgba8() {
    let mut device = device();
    let desc = TextureDesc::new_2d("albedo", 64, 64, TextureFormat::R8G8B8A8_UNORM).with_full_mip_chain();
    let pixels = vec![0x7Fu8; 64 * 64 * 4];

    let texture = ManagedTexture::upload(&mut device, &desc, &[pixels.as_slice()]).unwrap();

    assert_eq!(texture.size_in_bytes(), 16384);
    assert_eq!(texture.desc().mip_levels, calculate_mip_levels(64, 64, 1));
    assert_eq!(texture.desc().mip_levels, 7);
    assert!(texture.generate_mipmaps(&mut device).is_ok());
    assert_eq!(texture.texture().read_data().unwrap(), pixels);
}

#[test]
fn test_upload_without_data() {
    let mut device = device();
    let desc = TextureDesc::new_2d("target", 16, 16, TextureFormat::R8G8B8A8_UNORM);

    let texture = ManagedTexture::upload(&mut device, &desc, &[]).unwrap();

    assert_eq!(texture.label(), "target");
    assert_eq!(texture.texture().read_data().unwrap(), vec![0u8; 16 * 16 * 4]);
}

#[test]
fn test_upload_combines_cube_faces() {
    let mut device = device();
    let desc = TextureDesc::new_cube("sky", 4, TextureFormat::R8G8B8A8_UNORM);
    let faces: Vec<Vec<u8>> = (0u8..6).map(|face| vec![face; 4 * 4 * 4]).collect();
    let parts: Vec<&[u8]> = faces.iter().map(Vec::as_slice).collect();

    let texture = ManagedTexture::upload(&mut device, &desc, &parts).unwrap();

    let data = texture.texture().read_data().unwrap();
    assert_eq!(data.len(), 6 * 64);
    for face in 0..6 {
        assert!(data[face * 64..(face + 1) * 64].iter().all(|&b| b == face as u8));
    }
}

#[test]
fn test_upload_wrong_layer_count_fails() {
    let mut device = device();
    let desc = TextureDesc::new_2d("array", 4, 4, TextureFormat::R8G8B8A8_UNORM).with_array_layers(3);
    let layer = vec![0u8; 64];

    let result = ManagedTexture::upload(&mut device, &desc, &[layer.as_slice(), layer.as_slice()]);
    assert!(matches!(result, Err(Error::BackendError(_))));
    assert_eq!(device.stats().textures_alive, 0);
}

#[test]
fn test_upload_wrong_data_length_fails() {
    let mut device = device();
    let desc = TextureDesc::new_2d("albedo", 8, 8, TextureFormat::R8G8B8A8_UNORM);

    let result = ManagedTexture::upload(&mut device, &desc, &[&[0u8; 10][..]]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_update_layer_writes_host_copy() {
    let mut device = device();
    let desc = TextureDesc::new_2d("array", 2, 2, TextureFormat::R8G8B8A8_UNORM).with_array_layers(2);
    let texture = ManagedTexture::upload(&mut device, &desc, &[]).unwrap();

    texture.update_layer(&mut device, 1, &[9u8; 16]).unwrap();

    let data = texture.texture().read_data().unwrap();
    assert!(data[..16].iter().all(|&b| b == 0));
    assert!(data[16..].iter().all(|&b| b == 9));
}

#[test]
fn test_block_compressed_mipmaps_fail() {
    let mut device = device();
    let desc = TextureDesc::new_2d("bc1", 64, 64, TextureFormat::BC1_UNORM).with_full_mip_chain();
    let texture = ManagedTexture::upload(&mut device, &desc, &[]).unwrap();

    assert!(matches!(texture.generate_mipmaps(&mut device), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_bind_and_unload() {
    let mut device = device();
    let desc = TextureDesc::new_2d("albedo", 4, 4, TextureFormat::R8G8B8A8_UNORM);
    let mut texture = ManagedTexture::upload(&mut device, &desc, &[]).unwrap();

    texture.bind(&mut device, 0).unwrap();
    texture.unload().unwrap();

    assert!(texture.is_unloaded());
    assert!(texture.texture().is_disposed());
    assert_eq!(device.stats().textures_alive, 0);
    assert!(texture.bind(&mut device, 0).is_err());
    assert!(texture.generate_mipmaps(&mut device).is_err());
}

#[test]
fn test_double_unload_is_error() {
    let mut device = device();
    let desc = TextureDesc::new_2d("albedo", 4, 4, TextureFormat::R8G8B8A8_UNORM);
    let mut texture = ManagedTexture::upload(&mut device, &desc, &[]).unwrap();

    assert!(texture.unload().is_ok());
    assert!(texture.unload().is_err());
}
