/*!
# Galaxy 3D GPU

Backend-agnostic graphics device layer for the Galaxy 3D engine.

Rendering code talks to a `GraphicsDevice` trait object and never to a
native graphics API. Concrete backends are selected by name at startup;
the `"null"` backend is always available and runs headless. A validating
wrapper can be layered over any backend to check usage preconditions.

## Architecture

- **GraphicsDevice**: Factory, state-binding and submission trait
- **Buffer / Texture / Shader**: Resource traits sharing `GpuResource`
- **Pipeline states**: Rasterizer, blend, depth-stencil, sampler, input layout
- **Framebuffer**: Render target set
- **format**: Pixel format table and layout arithmetic
- **null**: Headless backend
- **validation**: Validating decorator over any backend
- **resource**: Mesh, texture and shader-library managers
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod format;
pub mod graphics_device;
pub mod null;
pub mod validation;
pub mod resource;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::{Engine, SharedGraphicsDevice};

    // Device trait
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device interface and resource model
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Pixel formats and layout utilities
    pub mod format {
        pub use crate::format::*;
    }

    // Headless backend
    pub mod null {
        pub use crate::null::*;
    }

    // Validating wrapper
    pub mod validation {
        pub use crate::validation::*;
    }

    // Consumer-side managers
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math library at crate root
pub use glam;
