use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::foundation::core::SurfaceId;

/// Liveness query answered by the surface-lifecycle collaborator.
///
/// A surface that is no longer live has implicitly freed its device memory; the backend then
/// skips buffer deletion for geometry owned by it and never picks it for eviction.
pub trait SurfaceRegistry {
    /// Whether `surface` still exists in the host environment.
    fn is_surface_live(&self, surface: SurfaceId) -> bool;
}

/// Shared set of live surfaces.
///
/// Clones share state: the host keeps one handle to add and remove surfaces while the backend
/// holds another.
#[derive(Clone, Debug, Default)]
pub struct SurfaceTable {
    live: Rc<RefCell<BTreeSet<SurfaceId>>>,
}

impl SurfaceTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `surfaces` already live.
    pub fn with_surfaces(surfaces: impl IntoIterator<Item = SurfaceId>) -> Self {
        let table = Self::new();
        table.live.borrow_mut().extend(surfaces);
        table
    }

    /// Mark `surface` live. Returns `false` if it already was.
    pub fn insert(&self, surface: SurfaceId) -> bool {
        self.live.borrow_mut().insert(surface)
    }

    /// Mark `surface` gone. Returns `false` if it was not live.
    pub fn remove(&self, surface: SurfaceId) -> bool {
        self.live.borrow_mut().remove(&surface)
    }

    /// Number of live surfaces.
    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    /// Whether no surface is live.
    pub fn is_empty(&self) -> bool {
        self.live.borrow().is_empty()
    }
}

impl SurfaceRegistry for SurfaceTable {
    fn is_surface_live(&self, surface: SurfaceId) -> bool {
        self.live.borrow().contains(&surface)
    }
}
