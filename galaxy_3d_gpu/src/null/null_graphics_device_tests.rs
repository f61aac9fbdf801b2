//! Unit tests for null_graphics_device.rs

use super::*;
use crate::format::TextureFormat;
use crate::graphics_device::{BufferType, ShaderStage, ShaderStageDesc};
use crate::engine::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};
use std::sync::Mutex;
use serial_test::serial;

fn device() -> NullGraphicsDevice {
    NullGraphicsDevice::new(&Config::default())
}

fn shader_desc() -> ShaderDesc {
    ShaderDesc::new(
        "basic",
        vec![
            ShaderStageDesc::new(ShaderStage::Vertex, "void main() {}"),
            ShaderStageDesc::new(ShaderStage::Fragment, "void main() {}"),
        ],
    )
}

#[test]
fn test_device_info_and_swapchain() {
    let device = device();

    assert_eq!(device.info().backend, "null");
    assert!(!device.info().validated);
    assert_eq!(device.swapchain().width, 1280);
    assert_eq!(device.swapchain().height, 720);
    assert_eq!(device.viewport(), Viewport::from_extent(1280, 720));
    assert!(!device.is_disposed());
}

#[test]
fn test_create_buffer_tracks_lifecycle() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("vb", BufferType::Vertex, 256), None)
        .unwrap();

    assert_eq!(buffer.size(), 256);
    assert_eq!(buffer.buffer_type(), BufferType::Vertex);
    assert_eq!(buffer.device_id(), device.id());
    assert!(!buffer.is_disposed());

    buffer.dispose();
    assert!(buffer.is_disposed());
}

#[test]
fn test_create_buffer_rejects_oversized_data() {
    let mut device = device();
    let result = device.create_buffer(&BufferDesc::new("small", BufferType::Uniform, 4), Some(&[0u8; 8]));
    assert!(matches!(result, Err(Error::InvalidResource(_))));

    let result = device.create_buffer(&BufferDesc::new("zero", BufferType::Uniform, 0), None);
    assert!(result.is_err());
}

#[test]
fn test_texture_keeps_host_copy() {
    let mut device = device();
    let desc = TextureDesc::new_2d("albedo", 64, 64, TextureFormat::R8G8B8A8_UNORM);
    let pixels = vec![0x7Fu8; 64 * 64 * 4];
    let texture = device.create_texture(&desc, Some(&pixels)).unwrap();

    assert_eq!(texture.size_in_bytes(), 16384);
    assert_eq!(texture.read_data().unwrap(), pixels);
}

#[test]
fn test_texture_description_errors_are_construction_errors() {
    let mut device = device();

    let unknown = TextureDesc::new_2d("unknown", 4, 4, TextureFormat::Unknown);
    assert!(matches!(device.create_texture(&unknown, None), Err(Error::UnsupportedFormat(_))));

    let zero = TextureDesc::new_2d("zero", 0, 4, TextureFormat::R8_UNORM);
    assert!(matches!(device.create_texture(&zero, None), Err(Error::InvalidResource(_))));
}

#[test]
fn test_update_texture_writes_host_copy() {
    let mut device = device();
    let desc = TextureDesc::new_2d("r8", 2, 2, TextureFormat::R8_UNORM);
    let texture = device.create_texture(&desc, None).unwrap();

    device
        .update_texture(&texture, &TextureRegion::full(&desc, 0, 0), &[1, 2, 3, 4])
        .unwrap();
    assert_eq!(texture.read_data().unwrap(), vec![1, 2, 3, 4]);
}

#[test]
fn test_shader_link_failure_returns_no_program() {
    let mut device = device();
    let bad = ShaderDesc::new("bad", vec![ShaderStageDesc::new(ShaderStage::Fragment, "void main() {}")]);

    assert!(matches!(device.create_shader(&bad), Err(Error::ShaderCompilation(_))));
    assert!(device.outstanding_resources().is_empty());

    let good = device.create_shader(&shader_desc()).unwrap();
    assert!(!good.is_compute());
}

#[test]
fn test_map_dynamic_buffer() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("ubo", BufferType::Uniform, 64).dynamic(), None)
        .unwrap();

    let window = device.map_buffer(&buffer, MapMode::WriteDiscard).unwrap();
    assert_eq!(window.len(), 64);
    window[0] = 1;

    assert!(buffer.is_mapped());
    assert!(device.map_buffer(&buffer, MapMode::Write).is_err());

    device.unmap_buffer(&buffer).unwrap();
    assert!(!buffer.is_mapped());
    assert!(device.unmap_buffer(&buffer).is_err());
}

#[test]
fn test_static_buffer_cannot_be_mapped_or_updated() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("static", BufferType::Vertex, 64), None)
        .unwrap();

    assert!(device.map_buffer(&buffer, MapMode::Write).is_err());
    assert!(!buffer.is_mapped());
    assert!(device.update_buffer(&buffer, 0, &[0u8; 4]).is_err());
}

#[test]
fn test_update_buffer_bounds() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("dyn", BufferType::Vertex, 16).dynamic(), None)
        .unwrap();

    assert!(device.update_buffer(&buffer, 8, &[0u8; 8]).is_ok());
    assert!(device.update_buffer(&buffer, 12, &[0u8; 8]).is_err());
    assert!(device.update_buffer(&buffer, u64::MAX, &[0u8; 1]).is_err());
}

#[test]
fn test_disposed_resource_is_rejected() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("dyn", BufferType::Vertex, 16).dynamic(), None)
        .unwrap();
    buffer.dispose();

    assert!(device.update_buffer(&buffer, 0, &[0u8; 4]).is_err());
    assert!(device.set_vertex_buffer(0, Some(&buffer), 16, 0).is_err());
}

#[test]
fn test_foreign_resource_is_rejected() {
    let mut first = device();
    let mut second = device();
    let buffer = first
        .create_buffer(&BufferDesc::new("vb", BufferType::Vertex, 16), None)
        .unwrap();

    match second.set_vertex_buffer(0, Some(&buffer), 16, 0) {
        Err(Error::InvalidResource(message)) => assert!(message.contains("belongs to device")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_draw_dispatch_present_update_stats() {
    let mut device = device();
    let _vb = device
        .create_buffer(&BufferDesc::new("vb", BufferType::Vertex, 128), None)
        .unwrap();
    let _tex = device
        .create_texture(&TextureDesc::new_2d("t", 4, 4, TextureFormat::R8G8B8A8_UNORM), None)
        .unwrap();

    device.draw(3, 0).unwrap();
    device.draw_indexed(6, 0, 0).unwrap();
    device.draw_indexed_instanced(6, 2, 0, 0, 0).unwrap();
    device.dispatch(1, 1, 1).unwrap();
    device.present(2).unwrap();

    let stats = device.stats();
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.dispatch_calls, 1);
    assert_eq!(stats.frames_presented, 1);
    assert_eq!(stats.buffers_alive, 1);
    assert_eq!(stats.buffer_memory, 128);
    assert_eq!(stats.textures_alive, 1);
    assert_eq!(stats.texture_memory, 64);
    assert_eq!(device.swapchain().swap_interval, 2);
}

#[test]
fn test_generate_mipmaps() {
    let mut device = device();
    let desc = TextureDesc::new_2d("mips", 64, 64, TextureFormat::R8G8B8A8_UNORM).with_full_mip_chain();
    let texture = device.create_texture(&desc, None).unwrap();
    assert_eq!(texture.desc().mip_levels, 7);
    assert!(device.generate_mipmaps(&texture).is_ok());

    let bc = TextureDesc::new_2d("bc", 64, 64, TextureFormat::BC3_UNORM).with_full_mip_chain();
    let bc_texture = device.create_texture(&bc, None).unwrap();
    assert!(matches!(device.generate_mipmaps(&bc_texture), Err(Error::UnsupportedFormat(_))));
}

/// Captures warnings raised by the null backend
struct WarningLogger {
    warnings: Arc<Mutex<Vec<String>>>,
}

impl Logger for WarningLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity == LogSeverity::Warn && entry.source == LOG_SOURCE {
            self.warnings.lock().unwrap().push(entry.message.clone());
        }
    }
}

#[test]
#[serial]
fn test_generate_mipmaps_single_level_warns() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(WarningLogger { warnings: Arc::clone(&warnings) });

    let mut device = device();
    let desc = TextureDesc::new_2d("flat", 64, 64, TextureFormat::R8G8B8A8_UNORM);
    let texture = device.create_texture(&desc, None).unwrap();
    assert_eq!(texture.desc().mip_levels, 1);
    assert!(device.generate_mipmaps(&texture).is_ok());

    let chained = TextureDesc::new_2d("chained", 64, 64, TextureFormat::R8G8B8A8_UNORM).with_full_mip_chain();
    let chained = device.create_texture(&chained, None).unwrap();
    assert!(device.generate_mipmaps(&chained).is_ok());

    Engine::reset_logger();
    let warnings = warnings.lock().unwrap();
    assert_eq!(warnings.iter().filter(|message| message.contains("'flat'")).count(), 1);
    assert!(!warnings.iter().any(|message| message.contains("'chained'")));
}

#[test]
fn test_framebuffer_requires_matching_attachments() {
    let mut device = device();
    let color = device
        .create_texture(&TextureDesc::new_2d("color", 32, 32, TextureFormat::R8G8B8A8_UNORM), None)
        .unwrap();
    let depth = device
        .create_texture(&TextureDesc::new_2d("depth", 16, 16, TextureFormat::D32_FLOAT), None)
        .unwrap();

    let desc = FramebufferDesc {
        label: "fb".to_string(),
        color_attachments: vec![Arc::clone(&color)],
        depth_stencil_attachment: None,
    };
    let framebuffer = device.create_framebuffer(&desc).unwrap();
    assert_eq!((framebuffer.width(), framebuffer.height()), (32, 32));
    assert!(framebuffer.disposed_attachment().is_none());

    let mismatched = FramebufferDesc { depth_stencil_attachment: Some(depth), ..desc };
    assert!(device.create_framebuffer(&mismatched).is_err());

    color.dispose();
    assert!(framebuffer.disposed_attachment().is_some());
}

#[test]
fn test_resize_and_viewport() {
    let mut device = device();
    device.resize(800, 600).unwrap();
    assert_eq!((device.swapchain().width, device.swapchain().height), (800, 600));
    assert!(device.resize(0, 600).is_err());

    let viewport = Viewport::from_extent(400, 300);
    device.set_viewport(viewport).unwrap();
    device.set_scissor(Rect2D::from_extent(10, 10)).unwrap();
    assert_eq!(device.viewport(), viewport);
    assert_eq!(device.scissor(), Rect2D::from_extent(10, 10));
}

#[test]
fn test_dispose_releases_everything() {
    let mut device = device();
    let buffer = device
        .create_buffer(&BufferDesc::new("vb", BufferType::Vertex, 16), None)
        .unwrap();
    let sampler = device.create_sampler_state(&SamplerStateDesc::default()).unwrap();
    assert_eq!(device.outstanding_resources().get(&ResourceKind::Buffer), Some(&1));

    device.dispose();

    assert!(device.is_disposed());
    assert!(buffer.is_disposed());
    assert!(sampler.is_disposed());
    assert!(matches!(device.draw(3, 0), Err(Error::DeviceDisposed)));
    assert!(matches!(
        device.create_buffer(&BufferDesc::new("late", BufferType::Vertex, 16), None),
        Err(Error::DeviceDisposed)
    ));

    // Second dispose is a no-op
    device.dispose();
}
