use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::backend::stats::BackendStats;
use crate::cache::evict::select_lru;
use crate::cache::record::{GeometryRecord, Released};
use crate::cache::store::GeometryCache;
use crate::events::surface::SurfaceRegistry;
use crate::foundation::core::GeometryId;
use crate::gpu::device::GpuDevice;
use crate::render::dispatch::DispatchState;

/// Backend state shared between [`GeometryBackend`](super::geometry_backend::GeometryBackend)
/// and the evictor it registers with the memory authority.
///
/// Borrows are short and never held across a call into the authority or a shader activation.
pub(crate) type SharedState = Rc<RefCell<CacheState>>;

/// Everything eviction needs: the records, the bind marker, the device and surface liveness.
pub(crate) struct CacheState {
    pub(crate) cache: GeometryCache,
    pub(crate) dispatch: DispatchState,
    pub(crate) device: Box<dyn GpuDevice>,
    pub(crate) surfaces: Box<dyn SurfaceRegistry>,
    pub(crate) stats: BackendStats,
}

impl fmt::Debug for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheState")
            .field("records", &self.cache.len())
            .field("dispatch", &self.dispatch)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl CacheState {
    pub(crate) fn new(device: Box<dyn GpuDevice>, surfaces: Box<dyn SurfaceRegistry>) -> Self {
        Self {
            cache: GeometryCache::new(),
            dispatch: DispatchState::default(),
            device,
            surfaces,
            stats: BackendStats::default(),
        }
    }

    pub(crate) fn shared(self) -> SharedState {
        Rc::new(RefCell::new(self))
    }

    /// Take `id` out of the cache and free its buffers.
    pub(crate) fn remove(&mut self, id: &GeometryId) -> Option<Released> {
        let record = self.cache.remove(id)?;
        self.dispatch.unbind_if(id);
        Some(self.release(record))
    }

    /// Free every record. Returns the number of records and their bytes.
    pub(crate) fn remove_all(&mut self) -> (usize, u64) {
        let records = self.cache.take_all();
        let count = records.len();
        let bytes: u64 = records.into_iter().map(|r| self.release(r).bytes).sum();
        self.dispatch.unbind();
        (count, bytes)
    }

    /// Drop records whose surface is gone. Returns the number of records and their bytes.
    pub(crate) fn remove_dead_surfaces(&mut self) -> (usize, u64) {
        let dead: Vec<GeometryId> = self
            .cache
            .iter()
            .filter(|r| !self.surfaces.is_surface_live(r.surface()))
            .map(|r| r.id().clone())
            .collect();
        let count = dead.len();
        let bytes: u64 = dead
            .iter()
            .filter_map(|id| self.remove(id))
            .map(|released| released.bytes)
            .sum();
        (count, bytes)
    }

    /// Evict the least-recently-used eligible record. Returns the bytes it held.
    pub(crate) fn evict_lru(&mut self) -> Option<u64> {
        let Some(id) =
            select_lru(self.cache.iter(), self.dispatch.marker.bound(), &*self.surfaces).cloned()
        else {
            tracing::debug!(records = self.cache.len(), "no eviction candidate");
            return None;
        };
        let record = self.cache.remove(&id)?;
        let last_used = record.last_used();
        // Candidates always have a live surface.
        let released = record.release(&mut *self.device, true);
        self.stats.note_record_released(&released);
        self.stats.evictions = self.stats.evictions.saturating_add(1);
        tracing::debug!(%id, last_used = last_used.0, bytes = released.bytes, "evicted geometry");
        Some(released.bytes)
    }

    fn release(&mut self, record: GeometryRecord) -> Released {
        let id = record.id().clone();
        let live = self.surfaces.is_surface_live(record.surface());
        let released = record.release(&mut *self.device, live);
        self.stats.note_record_released(&released);
        if !live {
            tracing::debug!(%id, skipped = released.skipped, "surface gone, skipped buffer deletes");
        }
        released
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/state.rs"]
mod tests;
