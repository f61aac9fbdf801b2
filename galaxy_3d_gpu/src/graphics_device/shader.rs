/// Shader program trait and descriptor
///
/// A program aggregates one attachment per stage. Stages are compiled and
/// linked together: creation either yields a complete program or fails.

use std::fmt;
use crate::graphics_device::GpuResource;

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Compute,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Compute => "compute",
        };
        f.write_str(name)
    }
}

/// Source attached to one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageDesc {
    pub stage: ShaderStage,
    /// Preprocessed source text
    pub source: String,
    /// Entry point function name
    pub entry_point: String,
}

impl ShaderStageDesc {
    pub fn new(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            stage,
            source: source.into(),
            entry_point: "main".to_string(),
        }
    }
}

/// Value of a specialization constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecializationValue {
    Bool(bool),
    I32(i32),
    U32(u32),
    F32(f32),
}

/// Specialization constant applied at link time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecializationConstant {
    pub id: u32,
    pub value: SpecializationValue,
}

/// Descriptor for creating a shader program
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDesc {
    /// Debug label
    pub label: String,
    /// Stage attachments
    pub stages: Vec<ShaderStageDesc>,
    /// Optional specialization constants
    pub specialization: Vec<SpecializationConstant>,
}

impl ShaderDesc {
    pub fn new(label: impl Into<String>, stages: Vec<ShaderStageDesc>) -> Self {
        Self {
            label: label.into(),
            stages,
            specialization: Vec::new(),
        }
    }

    /// Returns true if a stage of this kind is attached
    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.stages.iter().any(|attachment| attachment.stage == stage)
    }
}

/// Linked shader program trait
pub trait Shader: GpuResource {
    /// Creation descriptor
    fn desc(&self) -> &ShaderDesc;

    /// Returns true for compute programs
    fn is_compute(&self) -> bool {
        self.desc().has_stage(ShaderStage::Compute)
    }
}
