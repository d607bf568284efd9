//! Draw-time dispatch state and the shader-stage channel.

pub(crate) mod dispatch;
pub(crate) mod shader;
