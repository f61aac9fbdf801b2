/// Fixed-function pipeline state objects
///
/// Each state object wraps an immutable description, exposed read-only via
/// `desc()`. Only disposal changes a state object after creation.

use bitflags::bitflags;
use glam::Vec4;
use crate::graphics_device::{BufferFormat, GpuResource};

// ===== RASTERIZER =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

/// Rasterizer state description
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizerStateDesc {
    pub label: String,
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_bias: i32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
}

impl Default for RasterizerStateDesc {
    fn default() -> Self {
        Self {
            label: "rasterizer".to_string(),
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            depth_bias: 0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
            scissor_enable: false,
        }
    }
}

// ===== BLEND =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

bitflags! {
    /// Color channels written to a render target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const RED = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Blend configuration of one color attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub color_op: BlendOp,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub alpha_op: BlendOp,
    pub write_mask: ColorWriteMask,
}

impl RenderTargetBlendDesc {
    /// Blending disabled, all channels written
    pub const OPAQUE: Self = Self {
        blend_enable: false,
        src_color: BlendFactor::One,
        dst_color: BlendFactor::Zero,
        color_op: BlendOp::Add,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::Zero,
        alpha_op: BlendOp::Add,
        write_mask: ColorWriteMask::ALL,
    };

    /// Classic straight-alpha blending
    pub const ALPHA_BLEND: Self = Self {
        blend_enable: true,
        src_color: BlendFactor::SrcAlpha,
        dst_color: BlendFactor::OneMinusSrcAlpha,
        color_op: BlendOp::Add,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::OneMinusSrcAlpha,
        alpha_op: BlendOp::Add,
        write_mask: ColorWriteMask::ALL,
    };
}

/// Blend state description
#[derive(Debug, Clone, PartialEq)]
pub struct BlendStateDesc {
    pub label: String,
    pub alpha_to_coverage: bool,
    /// When false only `render_targets[0]` is used for every attachment
    pub independent_blend: bool,
    pub render_targets: Vec<RenderTargetBlendDesc>,
    /// Constant used by `ConstantColor` factors
    pub blend_factor: Vec4,
}

impl Default for BlendStateDesc {
    fn default() -> Self {
        Self {
            label: "blend".to_string(),
            alpha_to_coverage: false,
            independent_blend: false,
            render_targets: vec![RenderTargetBlendDesc::OPAQUE],
            blend_factor: Vec4::ONE,
        }
    }
}

// ===== DEPTH / STENCIL =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunction {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementClamp,
    DecrementClamp,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

/// Stencil operations for one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceDesc {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub compare: CompareFunction,
}

impl Default for StencilFaceDesc {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            compare: CompareFunction::Always,
        }
    }
}

/// Depth/stencil state description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthStencilStateDesc {
    pub label: String,
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare: CompareFunction,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: StencilFaceDesc,
    pub back_face: StencilFaceDesc,
}

impl Default for DepthStencilStateDesc {
    fn default() -> Self {
        Self {
            label: "depth_stencil".to_string(),
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare: CompareFunction::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: StencilFaceDesc::default(),
            back_face: StencilFaceDesc::default(),
        }
    }
}

// ===== SAMPLER =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

/// Sampler state description
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerStateDesc {
    pub label: String,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub mip_filter: FilterMode,
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub address_w: AddressMode,
    pub mip_lod_bias: f32,
    /// 1 disables anisotropic filtering
    pub max_anisotropy: u32,
    /// Comparison sampler when set
    pub compare: Option<CompareFunction>,
    pub border_color: Vec4,
    pub min_lod: f32,
    pub max_lod: f32,
}

impl SamplerStateDesc {
    /// Highest anisotropy level accepted by backends
    pub const MAX_ANISOTROPY: u32 = 16;
}

impl Default for SamplerStateDesc {
    fn default() -> Self {
        Self {
            label: "sampler".to_string(),
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Linear,
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            address_w: AddressMode::Repeat,
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            compare: None,
            border_color: Vec4::ZERO,
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

// ===== INPUT LAYOUT =====

/// Vertex input rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    /// Data is per-vertex
    Vertex,
    /// Data is per-instance
    Instance,
}

/// One vertex attribute fetched by the input assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputElement {
    /// Semantic name (POSITION, NORMAL, TEXCOORD...)
    pub semantic: String,
    /// Attribute location in the vertex shader
    pub location: u32,
    /// Data format
    pub format: BufferFormat,
    /// Vertex buffer slot the attribute is read from
    pub buffer_slot: u32,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
    pub input_rate: VertexInputRate,
}

/// Input layout description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayoutDesc {
    pub label: String,
    pub elements: Vec<InputElement>,
}

impl InputLayoutDesc {
    /// Tightly packed stride of a buffer slot (end of its last attribute)
    pub fn stride(&self, buffer_slot: u32) -> u32 {
        self.elements
            .iter()
            .filter(|element| element.buffer_slot == buffer_slot)
            .map(|element| element.offset + element.format.size_bytes())
            .max()
            .unwrap_or(0)
    }
}

// ===== TRAITS =====

/// Rasterizer state object
pub trait RasterizerState: GpuResource {
    fn desc(&self) -> &RasterizerStateDesc;
}

/// Blend state object
pub trait BlendState: GpuResource {
    fn desc(&self) -> &BlendStateDesc;
}

/// Depth/stencil state object
pub trait DepthStencilState: GpuResource {
    fn desc(&self) -> &DepthStencilStateDesc;
}

/// Sampler state object
pub trait SamplerState: GpuResource {
    fn desc(&self) -> &SamplerStateDesc;
}

/// Input layout object
pub trait InputLayout: GpuResource {
    fn desc(&self) -> &InputLayoutDesc;
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
