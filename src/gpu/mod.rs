//! Device seam: buffer ownership, the command trait and a recording implementation.

pub(crate) mod buffer;
pub(crate) mod device;
pub(crate) mod headless;
