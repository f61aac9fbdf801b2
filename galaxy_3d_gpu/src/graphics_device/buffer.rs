/// Buffer trait and buffer descriptor

use std::fmt;
use crate::graphics_device::GpuResource;

/// Logical buffer type, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferType {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
    /// Uniform/constant buffer
    Uniform,
    /// Shader storage buffer
    ShaderStorage,
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BufferType::Vertex => "VertexBuffer",
            BufferType::Index => "IndexBuffer",
            BufferType::Uniform => "UniformBuffer",
            BufferType::ShaderStorage => "ShaderStorageBuffer",
        };
        f.write_str(name)
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    /// Debug label
    pub label: String,
    /// Buffer type
    pub buffer_type: BufferType,
    /// Size in bytes
    pub size: u64,
    /// Dynamic buffers may be updated in place and mapped
    pub dynamic: bool,
}

impl BufferDesc {
    /// Static buffer of the given type and size
    pub fn new(label: impl Into<String>, buffer_type: BufferType, size: u64) -> Self {
        Self {
            label: label.into(),
            buffer_type,
            size,
            dynamic: false,
        }
    }

    /// Same descriptor with the dynamic flag set
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }
}

/// Access mode requested when mapping a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Read back current contents
    Read,
    /// Write, preserving contents not written
    Write,
    /// Read and write
    ReadWrite,
    /// Write, previous contents are discarded
    WriteDiscard,
    /// Write to a region the GPU is not using
    WriteNoOverwrite,
}

impl MapMode {
    /// Returns true if the mapped window must reflect current contents
    pub fn reads(&self) -> bool {
        matches!(self, MapMode::Read | MapMode::ReadWrite)
    }
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Vertex attribute data format
///
/// Defines the data type and component count of one input layout element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum BufferFormat {
    // Float formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,

    // Integer formats (signed)
    R32_SINT,
    R32G32_SINT,
    R32G32B32_SINT,
    R32G32B32A32_SINT,

    // Integer formats (unsigned)
    R32_UINT,
    R32G32_UINT,
    R32G32B32_UINT,
    R32G32B32A32_UINT,

    // Short formats
    R16G16_SINT,
    R16G16B16A16_SINT,
    R16G16_UINT,
    R16G16B16A16_UINT,

    // Byte formats
    R8G8B8A8_UINT,
    R8G8B8A8_UNORM,
}

impl BufferFormat {
    /// Returns size in bytes for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            BufferFormat::R32_SFLOAT | BufferFormat::R32_SINT | BufferFormat::R32_UINT => 4,
            BufferFormat::R32G32_SFLOAT | BufferFormat::R32G32_SINT | BufferFormat::R32G32_UINT => 8,
            BufferFormat::R32G32B32_SFLOAT | BufferFormat::R32G32B32_SINT | BufferFormat::R32G32B32_UINT => 12,
            BufferFormat::R32G32B32A32_SFLOAT | BufferFormat::R32G32B32A32_SINT | BufferFormat::R32G32B32A32_UINT => 16,

            BufferFormat::R16G16_SINT | BufferFormat::R16G16_UINT => 4,
            BufferFormat::R16G16B16A16_SINT | BufferFormat::R16G16B16A16_UINT => 8,

            BufferFormat::R8G8B8A8_UINT | BufferFormat::R8G8B8A8_UNORM => 4,
        }
    }
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types. Map state is tracked by
/// the buffer itself so every layer observes the same value.
pub trait Buffer: GpuResource {
    /// Creation descriptor
    fn desc(&self) -> &BufferDesc;

    /// True between a successful map and the matching unmap
    fn is_mapped(&self) -> bool;

    /// Size in bytes
    fn size(&self) -> u64 {
        self.desc().size
    }

    /// Logical buffer type
    fn buffer_type(&self) -> BufferType {
        self.desc().buffer_type
    }

    /// True if created dynamic
    fn is_dynamic(&self) -> bool {
        self.desc().dynamic
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
