//! Identifiers, primitive enums and the error taxonomy shared by every module.

pub(crate) mod core;
pub(crate) mod error;
