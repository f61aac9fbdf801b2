/// Validating wrapper - decorates a backend and every resource it creates
///
/// Layered over any `GraphicsDevice` when `ValidationConfig::enabled` is
/// set. Observable behavior matches the bare backend; diagnostics go to the
/// engine log and to the violation history of the device's
/// `ValidationContext`.

pub mod violation;
pub mod validation_context;
pub mod validated_resource;
pub mod validated_graphics_device;

pub use violation::{Violation, ViolationKind, ViolationSeverity};
pub use validation_context::{ValidationContext, ValidationStats};
pub use validated_resource::{
    Validated, ValidatedBlendState, ValidatedBuffer, ValidatedDepthStencilState,
    ValidatedFramebuffer, ValidatedInputLayout, ValidatedRasterizerState, ValidatedSamplerState,
    ValidatedShader, ValidatedTexture,
};
pub use validated_graphics_device::{BindPoint, SlotState, ValidatedGraphicsDevice};
