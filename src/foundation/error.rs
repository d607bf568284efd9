use crate::foundation::core::GeometryId;

/// Convenience result type used across geomcache.
pub type GeomResult<T> = Result<T, GeomError>;

/// Top-level error taxonomy used by cache and dispatch APIs.
#[derive(thiserror::Error, Debug)]
pub enum GeomError {
    /// A cache or dispatch operation ran while no surface was active.
    #[error("no active surface")]
    NoActiveSurface,

    /// The primitive name given at creation is not one of the supported kinds.
    #[error("invalid primitive kind: {0:?}")]
    InvalidPrimitiveKind(String),

    /// A required attribute array was absent at creation.
    #[error("missing required geometry data: {0}")]
    MissingRequiredData(&'static str),

    /// Attribute arrays were present but malformed.
    #[error("invalid geometry data: {0}")]
    InvalidData(String),

    /// A device buffer allocation was rejected by the allocation gate or the device.
    #[error("allocation failure for {what}: {reason}")]
    AllocationFailure {
        /// Human-readable description of the buffer being allocated.
        what: String,
        /// Why the allocation could not proceed.
        reason: String,
    },

    /// Dispatch or mutation was requested for an identifier that is not cached.
    #[error("unknown geometry: {0}")]
    UnknownGeometry(GeometryId),

    /// Invalid backend options.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GeomError {
    /// Build a [`GeomError::InvalidData`] value.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Build a [`GeomError::AllocationFailure`] value.
    pub fn allocation(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AllocationFailure {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`GeomError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
