//! Resource-level mesh type.
//!
//! A `Mesh` owns one vertex buffer and an optional index buffer created
//! from typed vertex/index slices.
//!
//! # Example
//!
//! ```no_run
//! use galaxy_3d_gpu::galaxy3d::render::{Config, GraphicsDevice};
//! use galaxy_3d_gpu::galaxy3d::null::NullGraphicsDevice;
//! use galaxy_3d_gpu::galaxy3d::resource::{Mesh, MeshDesc};
//!
//! let mut device = NullGraphicsDevice::new(&Config::default());
//! let positions: [[f32; 3]; 3] = [[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];
//! let mut mesh = Mesh::upload(&mut device, &MeshDesc::new("triangle", &positions))?;
//! mesh.bind(&mut device)?;
//! mesh.draw(&mut device)?;
//! mesh.unload()?;
//! # Ok::<(), galaxy_3d_gpu::galaxy3d::Error>(())
//! ```

use std::sync::Arc;
use bytemuck::Pod;
use crate::{engine_bail, engine_debug};
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, BufferType, GpuResource, GraphicsDevice, IndexType};

const LOG_SOURCE: &str = "galaxy3d::resource";

// ============================================================================
// MESH DESC
// ============================================================================

/// Descriptor for uploading a mesh
#[derive(Debug, Clone)]
pub struct MeshDesc {
    /// Debug label (buffers are labelled "<label>.vertices" / "<label>.indices")
    pub label: String,
    /// Raw vertex bytes
    pub vertex_data: Vec<u8>,
    /// Size in bytes of one vertex
    pub vertex_stride: u32,
    /// Raw index bytes (None for non-indexed meshes)
    pub index_data: Option<Vec<u8>>,
    /// Index element type
    pub index_type: IndexType,
    /// Dynamic meshes can be updated in place
    pub dynamic: bool,
}

impl MeshDesc {
    /// Non-indexed static mesh from a typed vertex slice
    pub fn new<V: Pod>(label: impl Into<String>, vertices: &[V]) -> Self {
        Self {
            label: label.into(),
            vertex_data: bytemuck::cast_slice(vertices).to_vec(),
            vertex_stride: std::mem::size_of::<V>() as u32,
            index_data: None,
            index_type: IndexType::U16,
            dynamic: false,
        }
    }

    /// Attach 16-bit indices
    pub fn with_indices_u16(mut self, indices: &[u16]) -> Self {
        self.index_data = Some(bytemuck::cast_slice(indices).to_vec());
        self.index_type = IndexType::U16;
        self
    }

    /// Attach 32-bit indices
    pub fn with_indices_u32(mut self, indices: &[u32]) -> Self {
        self.index_data = Some(bytemuck::cast_slice(indices).to_vec());
        self.index_type = IndexType::U32;
        self
    }

    /// Same descriptor with dynamic vertex storage
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }
}

// ============================================================================
// MESH
// ============================================================================

/// GPU-resident mesh
pub struct Mesh {
    label: String,
    vertex_buffer: Arc<dyn Buffer>,
    index_buffer: Option<Arc<dyn Buffer>>,
    vertex_stride: u32,
    vertex_count: u32,
    index_type: IndexType,
    index_count: u32,
    unloaded: bool,
}

impl Mesh {
    /// Create the GPU buffers and upload the descriptor's data
    pub fn upload(device: &mut dyn GraphicsDevice, desc: &MeshDesc) -> Result<Self> {
        let stride = desc.vertex_stride as usize;
        if stride == 0 {
            engine_bail!(LOG_SOURCE, "Mesh '{}' has a vertex stride of 0", desc.label);
        }
        if desc.vertex_data.is_empty() {
            engine_bail!(LOG_SOURCE, "Mesh '{}' has no vertex data", desc.label);
        }
        if desc.vertex_data.len() % stride != 0 {
            engine_bail!(LOG_SOURCE, "Mesh '{}': vertex data size {} is not a multiple of stride {}",
                desc.label, desc.vertex_data.len(), stride);
        }
        let vertex_count = (desc.vertex_data.len() / stride) as u32;

        let index_count = match &desc.index_data {
            Some(index_data) => {
                let index_size = desc.index_type.size_bytes() as usize;
                if index_data.is_empty() || index_data.len() % index_size != 0 {
                    engine_bail!(LOG_SOURCE, "Mesh '{}': index data size {} is not a multiple of index size {}",
                        desc.label, index_data.len(), index_size);
                }
                (index_data.len() / index_size) as u32
            }
            None => 0,
        };

        let mut vertex_desc = BufferDesc::new(
            format!("{}.vertices", desc.label),
            BufferType::Vertex,
            desc.vertex_data.len() as u64,
        );
        vertex_desc.dynamic = desc.dynamic;
        let vertex_buffer = device.create_buffer(&vertex_desc, Some(&desc.vertex_data))?;

        let index_buffer = match &desc.index_data {
            Some(index_data) => {
                let index_desc = BufferDesc::new(
                    format!("{}.indices", desc.label),
                    BufferType::Index,
                    index_data.len() as u64,
                );
                match device.create_buffer(&index_desc, Some(index_data)) {
                    Ok(buffer) => Some(buffer),
                    Err(error) => {
                        vertex_buffer.dispose();
                        return Err(error);
                    }
                }
            }
            None => None,
        };

        engine_debug!(LOG_SOURCE, "Mesh '{}' uploaded ({} vertices, {} indices)",
            desc.label, vertex_count, index_count);

        Ok(Self {
            label: desc.label.clone(),
            vertex_buffer,
            index_buffer,
            vertex_stride: desc.vertex_stride,
            vertex_count,
            index_type: desc.index_type,
            index_count,
            unloaded: false,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    pub fn vertex_buffer(&self) -> &Arc<dyn Buffer> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.index_buffer.as_ref()
    }

    fn ensure_loaded(&self, operation: &str) -> Result<()> {
        if self.unloaded {
            engine_bail!(LOG_SOURCE, "Mesh '{}': {} after unload", self.label, operation);
        }
        Ok(())
    }

    /// Replace the vertex bytes of a dynamic mesh
    ///
    /// The new data must have exactly the uploaded size; a mesh whose size
    /// changes has to be unloaded and uploaded again.
    pub fn update<V: Pod>(&self, device: &mut dyn GraphicsDevice, vertices: &[V]) -> Result<()> {
        self.ensure_loaded("update")?;
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        if bytes.len() as u64 != self.vertex_buffer.size() {
            engine_bail!(LOG_SOURCE, "Mesh '{}': update of {} bytes does not match the {} uploaded bytes",
                self.label, bytes.len(), self.vertex_buffer.size());
        }
        device.update_buffer(&self.vertex_buffer, 0, bytes)
    }

    /// Bind the vertex buffer to slot 0 and the index buffer if any
    pub fn bind(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_loaded("bind")?;
        device.set_vertex_buffer(0, Some(&self.vertex_buffer), self.vertex_stride, 0)?;
        if let Some(index_buffer) = &self.index_buffer {
            device.set_index_buffer(Some(index_buffer), self.index_type, 0)?;
        }
        Ok(())
    }

    /// Draw the whole mesh with the currently bound pipeline state
    pub fn draw(&self, device: &mut dyn GraphicsDevice) -> Result<()> {
        self.ensure_loaded("draw")?;
        if self.index_buffer.is_some() {
            device.draw_indexed(self.index_count, 0, 0)
        } else {
            device.draw(self.vertex_count, 0)
        }
    }

    /// Dispose the GPU buffers; a second call is an error
    pub fn unload(&mut self) -> Result<()> {
        if self.unloaded {
            engine_bail!(LOG_SOURCE, "Mesh '{}' already unloaded", self.label);
        }
        self.vertex_buffer.dispose();
        if let Some(index_buffer) = &self.index_buffer {
            index_buffer.dispose();
        }
        self.unloaded = true;
        engine_debug!(LOG_SOURCE, "Mesh '{}' unloaded", self.label);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
