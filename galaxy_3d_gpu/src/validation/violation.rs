/// Violation - one diagnostic raised by the validating wrapper

use std::fmt;
use crate::format::TextureFormat;
use crate::graphics_device::{BufferType, ResourceKind, TextureType, TextureUsage};

/// Severity of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ViolationSeverity {
    Warning,
    Error,
}

impl fmt::Display for ViolationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationSeverity::Warning => f.write_str("warning"),
            ViolationSeverity::Error => f.write_str("error"),
        }
    }
}

/// What went wrong, with the offending values
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// Any call after the device was disposed
    DeviceDisposed,
    /// Resource used after `dispose()`
    DisposedResource { kind: ResourceKind, label: String },
    /// Resource created by another device (or not by the validating wrapper)
    ForeignResource { kind: ResourceKind, label: String },
    /// `dispose()` called on an already disposed resource
    DoubleDispose { kind: ResourceKind, label: String },
    /// Buffer disposed between map and unmap
    DisposeWhileMapped { label: String },
    /// Map or update of a buffer created static
    StaticBufferWrite { buffer_type: BufferType, label: String },
    AlreadyMapped { label: String },
    NotMapped { label: String },
    /// Write outside the resource
    OutOfBounds { label: String, detail: String },
    /// Supplied data length differs from what the region requires
    DataLength { label: String, expected: u64, actual: u64 },
    /// Buffer bound to a slot of another type
    BufferTypeMismatch { expected: BufferType, actual: BufferType, label: String },
    /// Texture lacks the usage its binding requires
    MissingUsage { label: String, required: TextureUsage },
    /// Required state not bound before a draw/dispatch
    MissingBinding { binding: &'static str },
    /// Bound object was disposed while still bound
    InvalidatedBinding { binding: &'static str, label: String },
    /// Graphics program used for dispatch or compute program used for draw
    ShaderKindMismatch { label: String, expected_compute: bool },
    /// Framebuffer attachment disposed out of band
    DisposedAttachment { framebuffer: String, attachment: String },
    /// Framebuffer attachments disagree in size
    AttachmentMismatch { framebuffer: String, detail: String },
    InvalidSwapInterval { interval: u32 },
    IndexOutOfRange { first_index: u32, index_count: u32, available: u64 },
    /// Draw or dispatch that does no work
    EmptySubmission { detail: String },
    BlockCompressedMipmaps { label: String, format: TextureFormat },
    NotMipmappable { label: String, texture_type: TextureType },
    SingleMipLevel { label: String },
    DuplicateInputLocation { label: String, location: u32 },
    AnisotropyOutOfRange { label: String, value: u32 },
    InvalidShaderStages { label: String, detail: String },
    /// Incomplete or inconsistent creation description
    InvalidDescription { label: String, detail: String },
    /// Resources still alive when the device was disposed
    OutstandingResources { kind: ResourceKind, count: usize },
}

impl ViolationKind {
    /// Default severity of this kind
    pub fn severity(&self) -> ViolationSeverity {
        match self {
            ViolationKind::EmptySubmission { .. }
            | ViolationKind::SingleMipLevel { .. }
            | ViolationKind::OutstandingResources { .. } => ViolationSeverity::Warning,
            _ => ViolationSeverity::Error,
        }
    }

    /// True if forwarding the call would hand the backend an unusable request
    ///
    /// Blocking violations always fail the call, whatever the escalation policy.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ViolationKind::DeviceDisposed
                | ViolationKind::DisposedResource { .. }
                | ViolationKind::ForeignResource { .. }
                | ViolationKind::DoubleDispose { .. }
                | ViolationKind::StaticBufferWrite { .. }
                | ViolationKind::AlreadyMapped { .. }
                | ViolationKind::NotMapped { .. }
                | ViolationKind::OutOfBounds { .. }
                | ViolationKind::DataLength { .. }
        )
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DeviceDisposed => write!(f, "device has been disposed"),
            ViolationKind::DisposedResource { kind, label } => {
                write!(f, "{} '{}' has been disposed", kind, label)
            }
            ViolationKind::ForeignResource { kind, label } => {
                write!(f, "{} '{}' was not created by this device", kind, label)
            }
            ViolationKind::DoubleDispose { kind, label } => {
                write!(f, "{} '{}' disposed twice", kind, label)
            }
            ViolationKind::DisposeWhileMapped { label } => {
                write!(f, "buffer '{}' disposed while mapped", label)
            }
            ViolationKind::StaticBufferWrite { buffer_type, label } => {
                write!(f, "{} '{}' is static; map/update require a dynamic buffer", buffer_type, label)
            }
            ViolationKind::AlreadyMapped { label } => write!(f, "buffer '{}' is already mapped", label),
            ViolationKind::NotMapped { label } => write!(f, "buffer '{}' is not mapped", label),
            ViolationKind::OutOfBounds { label, detail } => write!(f, "'{}': {}", label, detail),
            ViolationKind::DataLength { label, expected, actual } => {
                write!(f, "'{}' expects {} bytes, got {}", label, expected, actual)
            }
            ViolationKind::BufferTypeMismatch { expected, actual, label } => {
                write!(f, "expected {} but '{}' is {}", expected, label, actual)
            }
            ViolationKind::MissingUsage { label, required } => {
                write!(f, "texture '{}' lacks usage {:?}", label, required)
            }
            ViolationKind::MissingBinding { binding } => write!(f, "no {} bound", binding),
            ViolationKind::InvalidatedBinding { binding, label } => {
                write!(f, "bound {} '{}' has been disposed", binding, label)
            }
            ViolationKind::ShaderKindMismatch { label, expected_compute } => {
                if *expected_compute {
                    write!(f, "shader '{}' is not a compute program", label)
                } else {
                    write!(f, "shader '{}' is a compute program", label)
                }
            }
            ViolationKind::DisposedAttachment { framebuffer, attachment } => {
                write!(f, "framebuffer '{}' attachment '{}' has been disposed", framebuffer, attachment)
            }
            ViolationKind::AttachmentMismatch { framebuffer, detail } => {
                write!(f, "framebuffer '{}': {}", framebuffer, detail)
            }
            ViolationKind::InvalidSwapInterval { interval } => {
                write!(f, "swap interval {} outside 0..=4", interval)
            }
            ViolationKind::IndexOutOfRange { first_index, index_count, available } => write!(
                f,
                "indices {}..{} exceed the {} indices of the bound index buffer",
                first_index,
                *first_index as u64 + *index_count as u64,
                available
            ),
            ViolationKind::EmptySubmission { detail } => write!(f, "{}", detail),
            ViolationKind::BlockCompressedMipmaps { label, format } => {
                write!(f, "cannot generate mipmaps for '{}': {:?} is block-compressed", label, format)
            }
            ViolationKind::NotMipmappable { label, texture_type } => {
                write!(f, "cannot generate mipmaps for '{}': {:?} has no mip chain", label, texture_type)
            }
            ViolationKind::SingleMipLevel { label } => {
                write!(f, "texture '{}' has a single mip level; nothing to generate", label)
            }
            ViolationKind::DuplicateInputLocation { label, location } => {
                write!(f, "input layout '{}' uses location {} twice", label, location)
            }
            ViolationKind::AnisotropyOutOfRange { label, value } => {
                write!(f, "sampler '{}' anisotropy {} outside 1..=16", label, value)
            }
            ViolationKind::InvalidShaderStages { label, detail } => {
                write!(f, "shader '{}': {}", label, detail)
            }
            ViolationKind::InvalidDescription { label, detail } => write!(f, "'{}': {}", label, detail),
            ViolationKind::OutstandingResources { kind, count } => {
                write!(f, "{} {} resource(s) still alive", count, kind)
            }
        }
    }
}

/// A recorded violation
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Device operation that raised it (`"map_buffer"`, `"draw_indexed"`, ...)
    pub operation: &'static str,
    pub kind: ViolationKind,
    pub severity: ViolationSeverity,
    /// Rendered description (`kind.to_string()`)
    pub message: String,
}

impl Violation {
    pub fn new(operation: &'static str, kind: ViolationKind) -> Self {
        Self {
            operation,
            severity: kind.severity(),
            message: kind.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.operation, self.message)
    }
}

#[cfg(test)]
#[path = "violation_tests.rs"]
mod tests;
