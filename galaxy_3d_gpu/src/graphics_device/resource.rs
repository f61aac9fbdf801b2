/// Common resource contract and per-device resource registry
///
/// Every GPU object handed out by a device implements `GpuResource`. The
/// device keeps a weak entry for each one so that disposing the device
/// disposes everything it created, and so outstanding objects can be
/// counted at shutdown.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;

new_key_type! {
    /// Generational identifier of a resource within its device
    pub struct ResourceId;
}

/// Identifier of the device instance a resource was created against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u64);

impl DeviceId {
    /// Allocate a process-unique device id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value (for diagnostics)
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Resource category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Buffer,
    Texture,
    Shader,
    RasterizerState,
    BlendState,
    DepthStencilState,
    SamplerState,
    InputLayout,
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Buffer => "Buffer",
            ResourceKind::Texture => "Texture",
            ResourceKind::Shader => "Shader",
            ResourceKind::RasterizerState => "RasterizerState",
            ResourceKind::BlendState => "BlendState",
            ResourceKind::DepthStencilState => "DepthStencilState",
            ResourceKind::SamplerState => "SamplerState",
            ResourceKind::InputLayout => "InputLayout",
            ResourceKind::Framebuffer => "Framebuffer",
        };
        f.write_str(name)
    }
}

/// Base trait of every device-created object
///
/// Disposal is one-way: `is_disposed()` flips from false to true exactly
/// once and never back.
pub trait GpuResource: Send + Sync {
    /// Identifier within the creating device
    fn id(&self) -> ResourceId;

    /// Device this resource was created against
    fn device_id(&self) -> DeviceId;

    /// Resource category
    fn kind(&self) -> ResourceKind;

    /// Debug label from the description
    fn label(&self) -> &str;

    /// True once `dispose()` has run
    fn is_disposed(&self) -> bool;

    /// Release the resource
    fn dispose(&self);

    /// Concrete-type access for the backend that created this resource
    fn as_any(&self) -> &dyn Any;
}

/// Weak index of the resources created by one device
pub struct ResourceRegistry {
    entries: SlotMap<ResourceId, Option<Weak<dyn GpuResource>>>,
    prune_at: usize,
}

impl ResourceRegistry {
    const INITIAL_PRUNE_THRESHOLD: usize = 64;

    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            prune_at: Self::INITIAL_PRUNE_THRESHOLD,
        }
    }

    /// Build a resource with a freshly allocated id and start tracking it
    ///
    /// If `build` fails the id is released again and nothing is tracked.
    pub fn register<T, F>(&mut self, build: F) -> Result<Arc<T>>
    where
        T: GpuResource + 'static,
        F: FnOnce(ResourceId) -> Result<T>,
    {
        if self.entries.len() >= self.prune_at {
            self.prune();
            self.prune_at = (self.entries.len() * 2).max(Self::INITIAL_PRUNE_THRESHOLD);
        }

        let id = self.entries.insert(None);
        match build(id) {
            Ok(resource) => {
                let resource = Arc::new(resource);
                let weak: Weak<dyn GpuResource> = Arc::downgrade(&resource) as Weak<dyn GpuResource>;
                self.entries[id] = Some(weak);
                Ok(resource)
            }
            Err(err) => {
                self.entries.remove(id);
                Err(err)
            }
        }
    }

    /// True if `id` refers to a resource of this registry that is still alive and not disposed
    pub fn is_live(&self, id: ResourceId) -> bool {
        self.entries
            .get(id)
            .and_then(|entry| entry.as_ref())
            .and_then(Weak::upgrade)
            .is_some_and(|resource| !resource.is_disposed())
    }

    /// Iterate over live, non-disposed resources
    pub fn live(&self) -> impl Iterator<Item = Arc<dyn GpuResource>> + '_ {
        self.entries
            .values()
            .flatten()
            .filter_map(Weak::upgrade)
            .filter(|resource| !resource.is_disposed())
    }

    /// Drop entries whose resource was dropped or disposed
    pub fn prune(&mut self) {
        self.entries.retain(|_, entry| {
            entry
                .as_ref()
                .and_then(Weak::upgrade)
                .is_some_and(|resource| !resource.is_disposed())
        });
    }

    /// Number of live, non-disposed resources
    pub fn live_count(&mut self) -> usize {
        self.prune();
        self.entries.len()
    }

    /// Live, non-disposed resources grouped by kind
    pub fn live_counts(&mut self) -> FxHashMap<ResourceKind, usize> {
        self.prune();
        let mut counts = FxHashMap::default();
        for resource in self.live() {
            *counts.entry(resource.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Dispose every live resource and clear the registry
    ///
    /// Returns the number of resources that were disposed.
    pub fn dispose_all(&mut self) -> usize {
        let mut disposed = 0;
        for (_, entry) in self.entries.drain() {
            if let Some(resource) = entry.as_ref().and_then(Weak::upgrade) {
                if !resource.is_disposed() {
                    resource.dispose();
                    disposed += 1;
                }
            }
        }
        disposed
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
