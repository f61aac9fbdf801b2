/// Null backend - a complete device that performs no GPU work
///
/// Buffers and pipeline-state objects only track their lifecycle. Textures
/// keep a host copy of their base level so content stays readable in
/// headless runs and tests.

pub mod null_resource;
pub mod null_buffer;
pub mod null_texture;
pub mod null_shader;
pub mod null_state;
pub mod null_framebuffer;
pub mod null_graphics_device;

pub use null_buffer::NullBuffer;
pub use null_texture::NullTexture;
pub use null_shader::NullShader;
pub use null_state::{
    NullBlendState, NullDepthStencilState, NullInputLayout, NullRasterizerState, NullSamplerState,
};
pub use null_framebuffer::NullFramebuffer;
pub use null_graphics_device::NullGraphicsDevice;
