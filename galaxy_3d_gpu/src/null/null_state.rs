/// Pipeline state objects - null implementations
///
/// Each object is just its immutable description plus a disposed flag.

use crate::graphics_device::{
    BlendState, BlendStateDesc, DepthStencilState, DepthStencilStateDesc, DeviceId, InputLayout,
    InputLayoutDesc, RasterizerState, RasterizerStateDesc, ResourceId, ResourceKind, SamplerState,
    SamplerStateDesc,
};
use super::null_resource::{impl_null_resource, NullResourceHeader};

macro_rules! null_state {
    ($name:ident, $desc:ty, $state_trait:ident, $kind:expr) => {
        /// Null pipeline state object
        pub struct $name {
            pub(crate) header: NullResourceHeader,
            desc: $desc,
        }

        impl $name {
            pub(crate) fn new(id: ResourceId, device_id: DeviceId, desc: &$desc) -> Self {
                Self {
                    header: NullResourceHeader::new(id, device_id, &desc.label),
                    desc: desc.clone(),
                }
            }
        }

        impl_null_resource!($name, $kind);

        impl $state_trait for $name {
            fn desc(&self) -> &$desc {
                &self.desc
            }
        }
    };
}

null_state!(NullRasterizerState, RasterizerStateDesc, RasterizerState, ResourceKind::RasterizerState);
null_state!(NullBlendState, BlendStateDesc, BlendState, ResourceKind::BlendState);
null_state!(NullDepthStencilState, DepthStencilStateDesc, DepthStencilState, ResourceKind::DepthStencilState);
null_state!(NullSamplerState, SamplerStateDesc, SamplerState, ResourceKind::SamplerState);
null_state!(NullInputLayout, InputLayoutDesc, InputLayout, ResourceKind::InputLayout);
