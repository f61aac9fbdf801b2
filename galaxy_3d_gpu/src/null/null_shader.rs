/// Shader - null implementation of the Shader trait
///
/// Nothing is compiled, but the stage set is linked structurally so that
/// malformed programs fail construction the same way they would on a
/// real device.

use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::graphics_device::{DeviceId, ResourceId, ResourceKind, Shader, ShaderDesc, ShaderStage};
use super::null_resource::{impl_null_resource, NullResourceHeader};

/// Null shader program
pub struct NullShader {
    pub(crate) header: NullResourceHeader,
    desc: ShaderDesc,
}

impl NullShader {
    pub(crate) fn new(id: ResourceId, device_id: DeviceId, desc: &ShaderDesc) -> Result<Self> {
        link(desc)?;
        Ok(Self {
            header: NullResourceHeader::new(id, device_id, &desc.label),
            desc: desc.clone(),
        })
    }
}

impl_null_resource!(NullShader, ResourceKind::Shader);

impl Shader for NullShader {
    fn desc(&self) -> &ShaderDesc {
        &self.desc
    }
}

/// Check that the stage attachments form a linkable program
pub(crate) fn link(desc: &ShaderDesc) -> Result<()> {
    let fail = |reason: String| Err(Error::ShaderCompilation(format!("'{}': {}", desc.label, reason)));

    if desc.stages.is_empty() {
        return fail("no stages attached".to_string());
    }

    let mut seen = FxHashSet::default();
    for attachment in &desc.stages {
        if !seen.insert(attachment.stage) {
            return fail(format!("{} stage attached twice", attachment.stage));
        }
        if attachment.source.trim().is_empty() {
            return fail(format!("{} stage has empty source", attachment.stage));
        }
        if attachment.entry_point.is_empty() {
            return fail(format!("{} stage has no entry point", attachment.stage));
        }
    }

    if seen.contains(&ShaderStage::Compute) && seen.len() > 1 {
        return fail("compute stage cannot be linked with graphics stages".to_string());
    }
    if !seen.contains(&ShaderStage::Compute) && !seen.contains(&ShaderStage::Vertex) {
        return fail("graphics program requires a vertex stage".to_string());
    }

    let mut ids = FxHashSet::default();
    for constant in &desc.specialization {
        if !ids.insert(constant.id) {
            return fail(format!("specialization constant {} set twice", constant.id));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "null_shader_tests.rs"]
mod tests;
