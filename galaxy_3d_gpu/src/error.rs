//! Error types for the Galaxy3D GPU layer
//!
//! Construction failures (bad descriptions, shader link errors, unknown
//! formats) and escalated validation diagnostics all surface through
//! the single `Error` enum below.

use std::fmt;

/// Result type for Galaxy3D GPU operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D GPU errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (driver failure, poisoned lock, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource or resource description
    InvalidResource(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),

    /// Pixel format not present in the format table
    UnsupportedFormat(String),

    /// Shader stages failed to compile or link
    ShaderCompilation(String),

    /// A validation diagnostic was escalated to a hard failure
    ValidationFailed(String),

    /// The device was disposed; no further operation is possible
    DeviceDisposed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            Error::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::ValidationFailed(msg) => write!(f, "Validation failed: {}", msg),
            Error::DeviceDisposed => write!(f, "Graphics device has been disposed"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
