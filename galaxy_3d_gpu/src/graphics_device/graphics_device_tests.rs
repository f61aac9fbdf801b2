//! Unit tests for graphics_device.rs

use super::*;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.backbuffer_width, 1280);
    assert_eq!(config.backbuffer_height, 720);
    assert_eq!(config.swap_interval, 1);
    assert_eq!(config.validation.escalation, Escalation::Never);
    assert!(config.validation.track_resources);
    assert_eq!(config.validation.enabled, cfg!(debug_assertions));
}

#[test]
fn test_viewport_and_scissor_from_extent() {
    let viewport = Viewport::from_extent(640, 480);
    assert_eq!(viewport.width, 640.0);
    assert_eq!(viewport.height, 480.0);
    assert_eq!(viewport.max_depth, 1.0);

    let scissor = Rect2D::from_extent(640, 480);
    assert_eq!(scissor, Rect2D { x: 0, y: 0, width: 640, height: 480 });
}

#[test]
fn test_registry_has_null_backend() {
    let registry = BackendRegistry::new();
    assert_eq!(registry.backend_names(), vec!["null"]);

    let device = registry.create_backend("null", &Config::default()).unwrap();
    assert_eq!(device.info().backend, "null");
    assert!(!device.info().validated);
}

#[test]
fn test_registry_unknown_backend_fails() {
    let registry = BackendRegistry::new();
    let result = registry.create_backend("metal", &Config::default());

    match result {
        Err(Error::InitializationFailed(message)) => assert!(message.contains("metal")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("unknown backend must not be created"),
    }
}

#[test]
fn test_registry_custom_backend() {
    let mut registry = BackendRegistry::new();
    registry.register_backend("custom", |_| {
        Err(Error::InitializationFailed("no adapter".to_string()))
    });

    assert_eq!(registry.backend_names(), vec!["custom", "null"]);
    assert!(registry.create_backend("custom", &Config::default()).is_err());
}

#[test]
fn test_create_graphics_device_layers_validation() {
    let mut config = Config::default();

    config.validation.enabled = true;
    let validated = create_graphics_device("null", &config).unwrap();
    assert!(validated.info().validated);
    assert_eq!(validated.info().backend, "null");

    config.validation.enabled = false;
    let raw = create_graphics_device("null", &config).unwrap();
    assert!(!raw.info().validated);
}

#[test]
fn test_create_graphics_device_factory_can_use_registry() {
    register_backend("reentrant", |config| {
        let names = backend_registry()
            .lock()
            .map_err(|_| Error::BackendError("registry unavailable".to_string()))?
            .backend_names();
        assert!(names.contains(&"reentrant"));
        Ok(Box::new(NullGraphicsDevice::new(config)) as Box<dyn GraphicsDevice>)
    })
    .unwrap();

    let mut config = Config::default();
    config.validation.enabled = false;
    let device = create_graphics_device("reentrant", &config).unwrap();
    assert_eq!(device.info().backend, "null");
}
