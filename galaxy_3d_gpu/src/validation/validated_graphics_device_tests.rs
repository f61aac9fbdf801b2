//! Unit tests for validated_graphics_device.rs

use super::*;
use crate::format::TextureFormat;
use crate::graphics_device::{
    Config, Escalation, InputElement, ShaderStageDesc, BufferFormat, VertexInputRate,
};
use crate::null::NullGraphicsDevice;
use crate::validation::ViolationSeverity;

fn device_with(escalation: Escalation) -> ValidatedGraphicsDevice {
    let config = ValidationConfig {
        enabled: true,
        escalation,
        track_resources: true,
        max_recorded_violations: 64,
    };
    ValidatedGraphicsDevice::new(Box::new(NullGraphicsDevice::new(&Config::default())), config)
}

fn device() -> ValidatedGraphicsDevice {
    device_with(Escalation::Never)
}

fn kinds(device: &ValidatedGraphicsDevice) -> Vec<ViolationKind> {
    device.violations().into_iter().map(|violation| violation.kind).collect()
}

fn graphics_shader(device: &mut ValidatedGraphicsDevice) -> Arc<dyn Shader> {
    device
        .create_shader(&ShaderDesc::new(
            "basic",
            vec![
                ShaderStageDesc::new(ShaderStage::Vertex, "void main() {}"),
                ShaderStageDesc::new(ShaderStage::Fragment, "void main() {}"),
            ],
        ))
        .unwrap()
}

fn buffer(device: &mut ValidatedGraphicsDevice, buffer_type: BufferType, size: u64, dynamic: bool) -> Arc<dyn Buffer> {
    let mut desc = BufferDesc::new("buffer", buffer_type, size);
    desc.dynamic = dynamic;
    device.create_buffer(&desc, None).unwrap()
}

#[test]
fn test_info_reports_validation() {
    let device = device();
    assert!(device.info().validated);
    assert_eq!(device.info().backend, "null");
}

#[test]
fn test_clean_usage_reports_nothing() {
    let mut device = device();
    let shader = graphics_shader(&mut device);
    let vertices = buffer(&mut device, BufferType::Vertex, 48, false);
    let indices = buffer(&mut device, BufferType::Index, 12, false);

    device.set_shader(Some(&shader)).unwrap();
    device.set_vertex_buffer(0, Some(&vertices), 16, 0).unwrap();
    device.set_index_buffer(Some(&indices), IndexType::U16, 0).unwrap();
    device.draw(3, 0).unwrap();
    device.draw_indexed(6, 0, 0).unwrap();
    device.present(1).unwrap();

    assert!(device.violations().is_empty());
    assert_eq!(device.stats().draw_calls, 2);
}

#[test]
fn test_map_static_buffer_never_returns_window() {
    let mut device = device();
    let vertices = buffer(&mut device, BufferType::Vertex, 64, false);

    let result = device.map_buffer(&vertices, MapMode::Write);
    assert!(matches!(result, Err(Error::ValidationFailed(_))));
    assert!(!vertices.is_mapped());
    assert!(matches!(kinds(&device)[0], ViolationKind::StaticBufferWrite { .. }));
}

#[test]
fn test_double_map_reported_on_second_call() {
    let mut device = device();
    let uniforms = buffer(&mut device, BufferType::Uniform, 64, true);

    assert_eq!(device.map_buffer(&uniforms, MapMode::WriteDiscard).unwrap().len(), 64);
    assert!(device.violations().is_empty());

    assert!(device.map_buffer(&uniforms, MapMode::WriteDiscard).is_err());
    assert_eq!(kinds(&device), vec![ViolationKind::AlreadyMapped { label: "buffer".to_string() }]);

    device.unmap_buffer(&uniforms).unwrap();
    assert!(device.map_buffer(&uniforms, MapMode::Write).is_ok());
}

#[test]
fn test_unmap_without_map() {
    let mut device = device();
    let uniforms = buffer(&mut device, BufferType::Uniform, 64, true);

    assert!(device.unmap_buffer(&uniforms).is_err());
    assert!(matches!(kinds(&device)[0], ViolationKind::NotMapped { .. }));
}

#[test]
fn test_update_after_dispose_is_rejected() {
    let mut device = device();
    let uniforms = buffer(&mut device, BufferType::Uniform, 16, true);
    uniforms.dispose();

    assert!(device.update_buffer(&uniforms, 0, &[1, 2, 3, 4]).is_err());
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::DisposedResource { kind: ResourceKind::Buffer, label: "buffer".to_string() }]
    );
}

#[test]
fn test_update_static_and_out_of_bounds() {
    let mut device = device();
    let static_buffer = buffer(&mut device, BufferType::Vertex, 16, false);
    let dynamic_buffer = buffer(&mut device, BufferType::Vertex, 16, true);

    assert!(device.update_buffer(&static_buffer, 0, &[0u8; 4]).is_err());
    assert!(device.update_buffer(&dynamic_buffer, 12, &[0u8; 8]).is_err());
    assert!(device.update_buffer(&dynamic_buffer, 8, &[0u8; 8]).is_ok());

    let reported = kinds(&device);
    assert_eq!(reported.len(), 2);
    assert!(matches!(reported[0], ViolationKind::StaticBufferWrite { .. }));
    assert!(matches!(reported[1], ViolationKind::OutOfBounds { .. }));
}

#[test]
fn test_index_buffer_in_vertex_slot_is_type_mismatch() {
    let mut device = device();
    let indices = buffer(&mut device, BufferType::Index, 64, false);

    // Reported, then forwarded under the default policy
    device.set_vertex_buffer(0, Some(&indices), 4, 0).unwrap();

    let violations = device.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].kind,
        ViolationKind::BufferTypeMismatch {
            expected: BufferType::Vertex,
            actual: BufferType::Index,
            label: "buffer".to_string(),
        }
    );
    assert!(violations[0].message.contains("VertexBuffer"));
    assert!(violations[0].message.contains("IndexBuffer"));
    assert_eq!(device.slot_state(BindPoint::VertexBuffer(0)), SlotState::Bound);
}

#[test]
fn test_type_mismatch_escalated() {
    let mut device = device_with(Escalation::Errors);
    let indices = buffer(&mut device, BufferType::Index, 64, false);

    assert!(matches!(
        device.set_vertex_buffer(0, Some(&indices), 4, 0),
        Err(Error::ValidationFailed(_))
    ));
    assert_eq!(device.slot_state(BindPoint::VertexBuffer(0)), SlotState::Unbound);
}

#[test]
fn test_draw_requirements() {
    let mut device = device();

    device.draw(3, 0).unwrap();
    assert_eq!(kinds(&device), vec![ViolationKind::MissingBinding { binding: "shader" }]);

    let shader = graphics_shader(&mut device);
    device.set_shader(Some(&shader)).unwrap();
    device.context().clear();

    device.draw_indexed(3, 0, 0).unwrap();
    assert_eq!(
        kinds(&device),
        vec![
            ViolationKind::MissingBinding { binding: "vertex buffer" },
            ViolationKind::MissingBinding { binding: "index buffer" },
        ]
    );
}

#[test]
fn test_index_range_checked() {
    let mut device = device();
    let shader = graphics_shader(&mut device);
    let vertices = buffer(&mut device, BufferType::Vertex, 64, false);
    let indices = buffer(&mut device, BufferType::Index, 12, false);
    device.set_shader(Some(&shader)).unwrap();
    device.set_vertex_buffer(0, Some(&vertices), 16, 0).unwrap();
    device.set_index_buffer(Some(&indices), IndexType::U32, 0).unwrap();

    device.draw_indexed(3, 0, 0).unwrap();
    assert!(device.violations().is_empty());

    device.draw_indexed(3, 1, 0).unwrap();
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::IndexOutOfRange { first_index: 1, index_count: 3, available: 3 }]
    );
}

#[test]
fn test_disposed_bound_shader_invalidates_slot() {
    let mut device = device();
    let shader = graphics_shader(&mut device);
    assert_eq!(device.slot_state(BindPoint::Shader), SlotState::Unbound);

    device.set_shader(Some(&shader)).unwrap();
    assert_eq!(device.slot_state(BindPoint::Shader), SlotState::Bound);

    shader.dispose();
    assert_eq!(device.slot_state(BindPoint::Shader), SlotState::Invalidated);
    device.draw(3, 0).unwrap();
    assert!(matches!(kinds(&device)[0], ViolationKind::InvalidatedBinding { binding: "shader", .. }));
    assert_eq!(device.stats().draw_calls, 1);
}

#[test]
fn test_disposed_bound_shader_fails_when_escalated() {
    let mut device = device_with(Escalation::Errors);
    let shader = graphics_shader(&mut device);
    device.set_shader(Some(&shader)).unwrap();
    shader.dispose();

    assert!(matches!(device.draw(3, 0), Err(Error::ValidationFailed(_))));
    assert!(matches!(kinds(&device)[0], ViolationKind::InvalidatedBinding { binding: "shader", .. }));
    assert_eq!(device.stats().draw_calls, 0);
}

#[test]
fn test_dispatch_needs_compute_program() {
    let mut device = device();
    let shader = graphics_shader(&mut device);
    device.set_shader(Some(&shader)).unwrap();

    device.dispatch(1, 1, 1).unwrap();
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::ShaderKindMismatch { label: "basic".to_string(), expected_compute: true }]
    );
}

#[test]
fn test_zero_counts_are_warnings() {
    let mut device = device();
    let shader = graphics_shader(&mut device);
    device.set_shader(Some(&shader)).unwrap();

    device.draw(0, 0).unwrap();
    let violations = device.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, ViolationSeverity::Warning);
}

#[test]
fn test_invalid_swap_interval() {
    let mut device = device();
    device.present(5).unwrap();
    assert_eq!(kinds(&device), vec![ViolationKind::InvalidSwapInterval { interval: 5 }]);

    let mut strict = device_with(Escalation::Errors);
    assert!(strict.present(5).is_err());
    assert!(strict.present(4).is_ok());
}

#[test]
fn test_mipmap_checks() {
    let mut device = device();

    let bc = device
        .create_texture(&TextureDesc::new_2d("bc", 64, 64, TextureFormat::BC1_UNORM).with_full_mip_chain(), None)
        .unwrap();
    // Reported, then the backend refuses it as well
    assert!(device.generate_mipmaps(&bc).is_err());
    assert!(matches!(kinds(&device)[0], ViolationKind::BlockCompressedMipmaps { .. }));
    device.context().clear();

    let single = device
        .create_texture(&TextureDesc::new_2d("single", 64, 64, TextureFormat::R8G8B8A8_UNORM), None)
        .unwrap();
    assert!(device.generate_mipmaps(&single).is_ok());
    let violations = device.violations();
    assert_eq!(violations[0].kind, ViolationKind::SingleMipLevel { label: "single".to_string() });
    assert_eq!(violations[0].severity, ViolationSeverity::Warning);
}

#[test]
fn test_texture_update_region_and_length() {
    let mut device = device();
    let desc = TextureDesc::new_2d("r8", 4, 4, TextureFormat::R8_UNORM);
    let texture = device.create_texture(&desc, None).unwrap();

    let region = TextureRegion::full(&desc, 0, 0);
    assert!(device.update_texture(&texture, &region, &[0u8; 15]).is_err());
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::DataLength { label: "r8".to_string(), expected: 16, actual: 15 }]
    );

    let outside = TextureRegion { mip_level: 1, ..region };
    assert!(device.update_texture(&texture, &outside, &[0u8; 16]).is_err());

    assert!(device.update_texture(&texture, &region, &[7u8; 16]).is_ok());
    assert_eq!(texture.read_data().unwrap(), vec![7u8; 16]);
}

#[test]
fn test_texture_description_checks() {
    let mut device = device();
    let desc = TextureDesc::new_2d("wrong", 4, 4, TextureFormat::R8G8B8A8_UNORM);

    // Reported, then the backend rejects the construction
    assert!(device.create_texture(&desc, Some(&[0u8; 10])).is_err());
    assert!(matches!(kinds(&device)[0], ViolationKind::InvalidDescription { .. }));
}

#[test]
fn test_state_description_checks() {
    let mut device = device();

    let sampler = SamplerStateDesc { max_anisotropy: 32, ..SamplerStateDesc::default() };
    device.create_sampler_state(&sampler).unwrap();

    let element = InputElement {
        semantic: "POSITION".to_string(),
        location: 0,
        format: BufferFormat::R32G32B32_SFLOAT,
        buffer_slot: 0,
        offset: 0,
        input_rate: VertexInputRate::Vertex,
    };
    let layout = InputLayoutDesc {
        label: "layout".to_string(),
        elements: vec![element.clone(), InputElement { offset: 12, ..element }],
    };
    device.create_input_layout(&layout).unwrap();

    let reported = kinds(&device);
    assert!(matches!(reported[0], ViolationKind::AnisotropyOutOfRange { value: 32, .. }));
    assert!(matches!(reported[1], ViolationKind::DuplicateInputLocation { location: 0, .. }));
}

#[test]
fn test_framebuffer_attachment_checks() {
    let mut device = device();
    let color = device
        .create_texture(
            &TextureDesc::new_2d("color", 32, 32, TextureFormat::R8G8B8A8_UNORM)
                .with_usage(TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED),
            None,
        )
        .unwrap();
    let desc = FramebufferDesc {
        label: "fb".to_string(),
        color_attachments: vec![Arc::clone(&color)],
        depth_stencil_attachment: None,
    };
    let framebuffer = device.create_framebuffer(&desc).unwrap();
    assert!(device.violations().is_empty());
    assert_eq!(framebuffer.width(), 32);

    device.set_framebuffer(Some(&framebuffer)).unwrap();
    color.dispose();
    device.set_framebuffer(Some(&framebuffer)).unwrap();
    assert!(matches!(kinds(&device)[0], ViolationKind::DisposedAttachment { .. }));

    let mut strict = device_with(Escalation::Errors);
    let color = strict
        .create_texture(
            &TextureDesc::new_2d("color", 32, 32, TextureFormat::R8G8B8A8_UNORM)
                .with_usage(TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED),
            None,
        )
        .unwrap();
    let desc = FramebufferDesc {
        label: "fb".to_string(),
        color_attachments: vec![Arc::clone(&color)],
        depth_stencil_attachment: None,
    };
    let framebuffer = strict.create_framebuffer(&desc).unwrap();
    color.dispose();
    assert!(strict.set_framebuffer(Some(&framebuffer)).is_err());
    assert!(matches!(kinds(&strict)[0], ViolationKind::DisposedAttachment { .. }));
}

#[test]
fn test_framebuffer_usage_reported() {
    let mut device = device();
    let sampled_only = device
        .create_texture(&TextureDesc::new_2d("sampled", 8, 8, TextureFormat::R8G8B8A8_UNORM), None)
        .unwrap();
    let desc = FramebufferDesc {
        label: "fb".to_string(),
        color_attachments: vec![sampled_only],
        depth_stencil_attachment: None,
    };

    device.create_framebuffer(&desc).unwrap();
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::MissingUsage { label: "sampled".to_string(), required: TextureUsage::RENDER_TARGET }]
    );
}

#[test]
fn test_foreign_resource_rejected() {
    let mut first = device();
    let mut second = device();
    let vertices = buffer(&mut first, BufferType::Vertex, 16, false);

    assert!(second.set_vertex_buffer(0, Some(&vertices), 16, 0).is_err());
    assert!(matches!(kinds(&second)[0], ViolationKind::ForeignResource { .. }));
}

#[test]
fn test_double_dispose_reported() {
    let mut device = device();
    let vertices = buffer(&mut device, BufferType::Vertex, 16, false);

    vertices.dispose();
    assert!(device.violations().is_empty());
    vertices.dispose();
    assert_eq!(
        kinds(&device),
        vec![ViolationKind::DoubleDispose { kind: ResourceKind::Buffer, label: "buffer".to_string() }]
    );
}

#[test]
fn test_dispose_while_mapped_reported() {
    let mut device = device();
    let uniforms = buffer(&mut device, BufferType::Uniform, 16, true);
    device.map_buffer(&uniforms, MapMode::Write).unwrap();

    uniforms.dispose();
    assert!(uniforms.is_disposed());
    assert!(matches!(kinds(&device)[0], ViolationKind::DisposeWhileMapped { .. }));
}

#[test]
fn test_dispose_while_mapped_refused_when_escalated() {
    let mut device = device_with(Escalation::Errors);
    let uniforms = buffer(&mut device, BufferType::Uniform, 16, true);
    device.map_buffer(&uniforms, MapMode::Write).unwrap();

    uniforms.dispose();
    assert!(!uniforms.is_disposed());
    assert!(matches!(kinds(&device)[0], ViolationKind::DisposeWhileMapped { .. }));
    assert_eq!(device.violations()[0].severity, ViolationSeverity::Error);

    device.unmap_buffer(&uniforms).unwrap();
    uniforms.dispose();
    assert!(uniforms.is_disposed());
    assert_eq!(device.violations().len(), 1);
}

#[test]
fn test_dispose_reports_outstanding_and_disposes_everything() {
    let mut device = device();
    let vertices = buffer(&mut device, BufferType::Vertex, 16, false);
    let shader = graphics_shader(&mut device);
    let released = buffer(&mut device, BufferType::Vertex, 16, false);
    released.dispose();

    device.dispose();

    assert!(device.is_disposed());
    assert!(vertices.is_disposed());
    assert!(shader.is_disposed());
    assert_eq!(
        kinds(&device),
        vec![
            ViolationKind::OutstandingResources { kind: ResourceKind::Buffer, count: 1 },
            ViolationKind::OutstandingResources { kind: ResourceKind::Shader, count: 1 },
        ]
    );

    assert!(matches!(device.draw(3, 0), Err(Error::DeviceDisposed)));
    // Disposing a resource the device already released is a double dispose
    vertices.dispose();
    assert!(matches!(kinds(&device).last(), Some(ViolationKind::DoubleDispose { .. })));
}

#[test]
fn test_parity_with_bare_backend() {
    let config = Config::default();
    let mut bare = NullGraphicsDevice::new(&config);
    let mut validated = device();

    for device in [&mut bare as &mut dyn GraphicsDevice, &mut validated as &mut dyn GraphicsDevice] {
        let desc = TextureDesc::new_2d("albedo", 4, 4, TextureFormat::R8G8B8A8_UNORM);
        let texture = device.create_texture(&desc, Some(&[3u8; 64])).unwrap();
        let shader = device
            .create_shader(&ShaderDesc::new(
                "basic",
                vec![ShaderStageDesc::new(ShaderStage::Vertex, "void main() {}")],
            ))
            .unwrap();
        device.set_shader(Some(&shader)).unwrap();
        device.set_texture(0, Some(&texture)).unwrap();
        device.draw(3, 0).unwrap();
        device.draw(0, 0).unwrap();
        device.present(7).unwrap();

        assert_eq!(texture.read_data().unwrap(), vec![3u8; 64]);

        let target = device
            .create_texture(
                &TextureDesc::new_2d("target", 4, 4, TextureFormat::R8G8B8A8_UNORM)
                    .with_usage(TextureUsage::RENDER_TARGET),
                None,
            )
            .unwrap();
        let framebuffer = device
            .create_framebuffer(&FramebufferDesc {
                label: "fb".to_string(),
                color_attachments: vec![Arc::clone(&target)],
                depth_stencil_attachment: None,
            })
            .unwrap();
        target.dispose();
        device.set_framebuffer(Some(&framebuffer)).unwrap();

        shader.dispose();
        device.draw(3, 0).unwrap();
    }

    assert_eq!(bare.stats(), validated.stats());
    assert_eq!(bare.swapchain(), validated.swapchain());
}
