/// Texture - null implementation of the Texture trait
///
/// The base level of every layer is kept in host memory, laid out layer
/// after layer with tightly packed rows (block rows for BCn formats).

use std::sync::Mutex;
use crate::error::{Error, Result};
use crate::format;
use crate::graphics_device::{
    DeviceId, GpuResource, ResourceId, ResourceKind, Texture, TextureDesc, TextureRegion,
};
use super::null_resource::{impl_null_resource, NullResourceHeader};

/// Null texture with a host copy of its base level
pub struct NullTexture {
    pub(crate) header: NullResourceHeader,
    desc: TextureDesc,
    size: u64,
    data: Mutex<Vec<u8>>,
}

impl NullTexture {
    /// Create the host copy; `data`, when given, must match `desc.data_size()` exactly
    pub(crate) fn new(
        id: ResourceId,
        device_id: DeviceId,
        desc: &TextureDesc,
        data: Option<&[u8]>,
    ) -> Result<Self> {
        let size = desc.data_size()?;
        let host_len = usize::try_from(size).map_err(|_| Error::OutOfMemory)?;

        let host = match data {
            Some(data) if data.len() != host_len => {
                return Err(Error::InvalidResource(format!(
                    "texture '{}' expects {} bytes of initial data, got {}",
                    desc.label,
                    size,
                    data.len()
                )));
            }
            Some(data) => data.to_vec(),
            None => vec![0u8; host_len],
        };

        Ok(Self {
            header: NullResourceHeader::new(id, device_id, &desc.label),
            desc: desc.clone(),
            size,
            data: Mutex::new(host),
        })
    }

    /// Copy tightly packed region data into the host copy
    ///
    /// Only the base level is stored; updates to other levels are accepted
    /// and discarded.
    pub(crate) fn write_region(&self, region: &TextureRegion, data: &[u8]) -> Result<()> {
        region.check_bounds(&self.desc)?;
        let expected = region.data_size(self.desc.format)?;
        if data.len() as u64 != expected {
            return Err(Error::InvalidResource(format!(
                "texture '{}' region expects {} bytes, got {}",
                self.desc.label,
                expected,
                data.len()
            )));
        }
        if region.mip_level != 0 {
            return Ok(());
        }

        let fmt = self.desc.format;
        let dst_row_pitch = format::calculate_row_pitch(fmt, self.desc.width)? as usize;
        let dst_rows = format::calculate_row_count(fmt, self.desc.height) as usize;
        let dst_slice = dst_row_pitch * dst_rows;
        let layer_size = self.desc.layer_size(0)? as usize;

        let src_row_pitch = format::calculate_row_pitch(fmt, region.width)? as usize;
        let src_rows = format::calculate_row_count(fmt, region.height) as usize;
        let x_offset = column_offset(fmt, region.x)?;
        let y_offset = if region.y == 0 { 0 } else { format::calculate_row_count(fmt, region.y) as usize };

        let mut host = self
            .data
            .lock()
            .map_err(|_| Error::BackendError("texture host copy lock poisoned".to_string()))?;

        for slice in 0..region.depth as usize {
            let slice_base = region.layer as usize * layer_size + (region.z as usize + slice) * dst_slice;
            for row in 0..src_rows {
                let dst = slice_base + (y_offset + row) * dst_row_pitch + x_offset;
                let src = (slice * src_rows + row) * src_row_pitch;
                host[dst..dst + src_row_pitch].copy_from_slice(&data[src..src + src_row_pitch]);
            }
        }
        Ok(())
    }
}

/// Byte offset of texel column `x` within a row
fn column_offset(fmt: format::TextureFormat, x: u32) -> Result<usize> {
    if x == 0 {
        Ok(0)
    } else {
        Ok(format::calculate_row_pitch(fmt, x)? as usize)
    }
}

impl_null_resource!(NullTexture, ResourceKind::Texture);

impl Texture for NullTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn size_in_bytes(&self) -> u64 {
        self.size
    }

    fn read_data(&self) -> Result<Vec<u8>> {
        if self.is_disposed() {
            return Err(Error::InvalidResource(format!(
                "texture '{}' has been disposed",
                self.desc.label
            )));
        }
        let host = self
            .data
            .lock()
            .map_err(|_| Error::BackendError("texture host copy lock poisoned".to_string()))?;
        Ok(host.clone())
    }
}

#[cfg(test)]
#[path = "null_texture_tests.rs"]
mod tests;
