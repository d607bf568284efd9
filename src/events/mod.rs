//! Lifecycle notifications and the surface-liveness capability.

pub(crate) mod lifecycle;
pub(crate) mod surface;
