use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::backend::state::{CacheState, SharedState};
use crate::cache::record::GeometryRecord;
use crate::events::surface::SurfaceRegistry;
use crate::foundation::core::GeometryId;
use crate::memory::authority::Evictor;

/// Least-recently-used candidate among `records`.
///
/// Skips `protected` (the bound geometry) and records whose surface is gone. Only a strictly
/// older record replaces the current candidate, so ties go to the first one enumerated.
pub(crate) fn select_lru<'a>(
    records: impl IntoIterator<Item = &'a GeometryRecord>,
    protected: Option<&GeometryId>,
    surfaces: &dyn SurfaceRegistry,
) -> Option<&'a GeometryId> {
    let mut best: Option<&GeometryRecord> = None;
    for record in records {
        if protected == Some(record.id()) || !surfaces.is_surface_live(record.surface()) {
            continue;
        }
        if best.is_none_or(|b| record.last_used() < b.last_used()) {
            best = Some(record);
        }
    }
    best.map(GeometryRecord::id)
}

/// The geometry cache's evictor, as registered with the memory authority.
///
/// Holds a weak handle so a dropped backend simply stops offering records. While the backend is
/// itself borrowing its state (drawing, or exporting to the shader stage) the evictor reports
/// nothing; `create` never holds a borrow across the allocation gate, so pressure raised by its
/// own uploads still reaches committed records. The record being assembled is not in the cache
/// yet and cannot be chosen.
pub(crate) struct CacheEvictor {
    state: Weak<RefCell<CacheState>>,
}

impl CacheEvictor {
    pub(crate) fn new(state: &SharedState) -> Self {
        Self {
            state: Rc::downgrade(state),
        }
    }
}

impl Evictor for CacheEvictor {
    fn evict_one(&mut self) -> Option<u64> {
        let cell = self.state.upgrade()?;
        let Ok(mut state) = cell.try_borrow_mut() else {
            tracing::debug!("geometry cache busy, nothing offered for eviction");
            return None;
        };
        state.evict_lru()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/evict.rs"]
mod tests;
