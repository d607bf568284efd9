//! Geometry records, their keyed store and LRU eviction.

pub(crate) mod evict;
pub(crate) mod record;
pub(crate) mod store;
