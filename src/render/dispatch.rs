use crate::foundation::core::{GeometryId, LogicalTime, SurfaceId};
use crate::foundation::error::{GeomError, GeomResult};

/// Which geometry, if any, currently has its buffers exported and its index buffer bound.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BindMarker {
    /// Nothing is known to be bound; the next draw exports.
    #[default]
    Unset,
    /// The wrapped id is bound; drawing it again takes the fast path.
    Bound(GeometryId),
}

impl BindMarker {
    /// The bound id, if any.
    pub fn bound(&self) -> Option<&GeometryId> {
        match self {
            BindMarker::Unset => None,
            BindMarker::Bound(id) => Some(id),
        }
    }

    /// Whether `id` is the bound geometry.
    pub fn is_bound_to(&self, id: &GeometryId) -> bool {
        self.bound() == Some(id)
    }
}

/// Draw-time state: active surface, bind marker and logical clock.
#[derive(Debug, Default)]
pub(crate) struct DispatchState {
    pub(crate) active_surface: Option<SurfaceId>,
    pub(crate) marker: BindMarker,
    pub(crate) clock: LogicalTime,
}

impl DispatchState {
    pub(crate) fn require_surface(&self) -> GeomResult<SurfaceId> {
        self.active_surface.ok_or(GeomError::NoActiveSurface)
    }

    /// Store `now` unless it would move the clock backwards.
    pub(crate) fn advance_clock(&mut self, now: LogicalTime) -> bool {
        if now < self.clock {
            return false;
        }
        self.clock = now;
        true
    }

    pub(crate) fn bind(&mut self, id: GeometryId) {
        self.marker = BindMarker::Bound(id);
    }

    pub(crate) fn unbind(&mut self) {
        self.marker = BindMarker::Unset;
    }

    /// Unset the marker if it points at `id`.
    pub(crate) fn unbind_if(&mut self, id: &GeometryId) -> bool {
        if self.marker.is_bound_to(id) {
            self.unbind();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
