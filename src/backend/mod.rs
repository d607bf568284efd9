//! The geometry backend context object: cache operations, draw dispatch and event handling.

pub(crate) mod draw;
pub(crate) mod geometry_backend;
pub(crate) mod opts;
pub(crate) mod state;
pub(crate) mod stats;
