//! Allocation gate and memory-pressure authority.

pub(crate) mod authority;
