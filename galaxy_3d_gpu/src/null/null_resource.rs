/// Lifecycle state shared by every null resource

use std::sync::atomic::{AtomicBool, Ordering};
use crate::graphics_device::{DeviceId, ResourceId};

/// Identity and disposed flag of a null resource
pub(crate) struct NullResourceHeader {
    pub(crate) id: ResourceId,
    pub(crate) device_id: DeviceId,
    pub(crate) label: String,
    disposed: AtomicBool,
}

impl NullResourceHeader {
    pub(crate) fn new(id: ResourceId, device_id: DeviceId, label: &str) -> Self {
        Self {
            id,
            device_id,
            label: label.to_string(),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Flip the disposed flag; returns false if it was already set
    pub(crate) fn dispose(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }
}

/// Implement `GpuResource` for a null resource holding a `header` field
macro_rules! impl_null_resource {
    ($ty:ty, $kind:expr) => {
        impl $crate::graphics_device::GpuResource for $ty {
            fn id(&self) -> $crate::graphics_device::ResourceId {
                self.header.id
            }

            fn device_id(&self) -> $crate::graphics_device::DeviceId {
                self.header.device_id
            }

            fn kind(&self) -> $crate::graphics_device::ResourceKind {
                $kind
            }

            fn label(&self) -> &str {
                &self.header.label
            }

            fn is_disposed(&self) -> bool {
                self.header.is_disposed()
            }

            fn dispose(&self) {
                self.header.dispose();
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

pub(crate) use impl_null_resource;
