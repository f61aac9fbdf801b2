/// Graphics device module - the device contract and every resource contract

// Module declarations
pub mod resource;
pub mod buffer;
pub mod texture;
pub mod shader;
pub mod pipeline_state;
pub mod framebuffer;
pub mod graphics_device;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use resource::*;
pub use buffer::*;
pub use texture::*;
pub use shader::*;
pub use pipeline_state::*;
pub use framebuffer::*;
