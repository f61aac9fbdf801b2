//! Consumer-side resource managers
//!
//! Thin owners of device resources that follow the consumer contract:
//! upload before use, update in place when only the bytes change, and
//! unload exactly once.

pub mod mesh;
pub mod managed_texture;
pub mod shader_library;

pub use mesh::{Mesh, MeshDesc};
pub use managed_texture::ManagedTexture;
pub use shader_library::ShaderLibrary;
