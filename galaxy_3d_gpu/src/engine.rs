/// Galaxy3D Engine - process-wide singleton holder
///
/// Holds the global logger and the single active graphics device. The
/// device is wrapped in `Arc<Mutex<..>>`: command submission is
/// single-threaded, and the mutex is how multi-threaded callers serialize
/// access to it.

use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::graphics_device::{self, Config, GraphicsDevice};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};

/// Shared handle to the active graphics device
pub type SharedGraphicsDevice = Arc<Mutex<Box<dyn GraphicsDevice>>>;

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// The one active graphics device
    graphics_device: RwLock<Option<SharedGraphicsDevice>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            graphics_device: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_gpu::galaxy3d::Engine;
/// use galaxy_3d_gpu::galaxy3d::render::Config;
///
/// Engine::initialize()?;
/// let device = Engine::create_graphics_device("null", &Config::default())?;
/// // device.lock() ... create resources, draw, present
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_gpu::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Initialization failed: {}", msg);
            }
            Error::BackendError(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Backend error: {}", msg);
            }
            _ => {
                crate::engine_error!("galaxy3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| {
            Self::log_and_return_error(Error::InitializationFailed(
                "Engine not initialized. Call Engine::initialize() first.".to_string(),
            ))
        })
    }

    /// Initialize the engine
    ///
    /// Must be called once at startup before creating a device. Idempotent.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine, disposing the active device if any
    ///
    /// The engine can be used again after shutdown; the state stays initialized.
    pub fn shutdown() {
        if ENGINE_STATE.get().is_some() {
            let _ = Self::destroy_graphics_device();
        }
    }

    // ===== BACKENDS =====

    /// Register a backend factory in the global backend registry
    pub fn register_backend<F>(name: &'static str, factory: F) -> Result<()>
    where
        F: Fn(&Config) -> Result<Box<dyn GraphicsDevice>> + Send + Sync + 'static,
    {
        graphics_device::register_backend(name, factory)?;
        crate::engine_info!("galaxy3d::Engine", "Backend '{}' registered", name);
        Ok(())
    }

    /// Names of the registered backends, sorted
    pub fn backend_names() -> Result<Vec<&'static str>> {
        let registry = graphics_device::backend_registry()
            .lock()
            .map_err(|_| Self::log_and_return_error(Error::BackendError("Backend registry lock poisoned".to_string())))?;
        Ok(registry.backend_names())
    }

    // ===== GRAPHICS DEVICE =====

    /// Create the active graphics device from a registered backend
    ///
    /// The validating wrapper is layered on top when `config.validation.enabled`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A device already exists (only one device may be active per process)
    /// - The backend is unknown or fails to initialize
    pub fn create_graphics_device(backend: &str, config: &Config) -> Result<SharedGraphicsDevice> {
        let state = Self::state()?;
        let mut lock = state.graphics_device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Graphics device lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(Error::InitializationFailed(
                "Graphics device already exists. Call Engine::destroy_graphics_device() first.".to_string(),
            )));
        }

        let device = graphics_device::create_graphics_device(backend, config)
            .map_err(Self::log_and_return_error)?;
        let device: SharedGraphicsDevice = Arc::new(Mutex::new(device));
        *lock = Some(Arc::clone(&device));

        crate::engine_info!("galaxy3d::Engine", "Graphics device created (backend: {}, validation: {})",
            backend, config.validation.enabled);
        Ok(device)
    }

    /// Get the active graphics device
    pub fn graphics_device() -> Result<SharedGraphicsDevice> {
        let state = Self::state()?;
        let lock = state.graphics_device.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Graphics device lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(Error::InitializationFailed(
                "Graphics device not created. Call Engine::create_graphics_device() first.".to_string(),
            )))
    }

    /// Dispose and remove the active graphics device
    ///
    /// Every resource the device created is disposed with it. Handles to
    /// the device stay valid but report it as disposed.
    pub fn destroy_graphics_device() -> Result<()> {
        let state = Self::state()?;
        let device = state.graphics_device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("Graphics device lock poisoned".to_string())
            ))?
            .take();

        if let Some(device) = device {
            let mut device = device.lock()
                .map_err(|_| Self::log_and_return_error(
                    Error::BackendError("Graphics device mutex poisoned".to_string())
                ))?;
            device.dispose();
            crate::engine_info!("galaxy3d::Engine", "Graphics device destroyed");
        }
        Ok(())
    }

    /// Drop the active device without disposing it (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.graphics_device.write() {
                *device = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// ```no_run
    /// use galaxy_3d_gpu::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level (typically Error)
    /// * `source` - Source module (e.g., "galaxy3d::validation")
    /// * `message` - Log message
    /// * `file` - Source file path
    /// * `line` - Source line number
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
