/// Buffer - null implementation of the Buffer trait
///
/// No storage is allocated; only the description and the map state exist.

use std::sync::atomic::{AtomicBool, Ordering};
use crate::graphics_device::{Buffer, BufferDesc, DeviceId, ResourceId, ResourceKind};
use super::null_resource::{impl_null_resource, NullResourceHeader};

/// Null buffer
pub struct NullBuffer {
    pub(crate) header: NullResourceHeader,
    desc: BufferDesc,
    mapped: AtomicBool,
}

impl NullBuffer {
    pub(crate) fn new(id: ResourceId, device_id: DeviceId, desc: &BufferDesc) -> Self {
        Self {
            header: NullResourceHeader::new(id, device_id, &desc.label),
            desc: desc.clone(),
            mapped: AtomicBool::new(false),
        }
    }

    /// Set the map flag; returns false if the buffer was already mapped
    pub(crate) fn begin_map(&self) -> bool {
        !self.mapped.swap(true, Ordering::AcqRel)
    }

    /// Clear the map flag; returns false if the buffer was not mapped
    pub(crate) fn end_map(&self) -> bool {
        self.mapped.swap(false, Ordering::AcqRel)
    }
}

impl_null_resource!(NullBuffer, ResourceKind::Buffer);

impl Buffer for NullBuffer {
    fn desc(&self) -> &BufferDesc {
        &self.desc
    }

    fn is_mapped(&self) -> bool {
        self.mapped.load(Ordering::Acquire)
    }
}
