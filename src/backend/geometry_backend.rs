use std::cell::Ref;
use std::fmt;

use crate::backend::opts::BackendOpts;
use crate::backend::state::{CacheState, SharedState};
use crate::backend::stats::BackendStats;
use crate::cache::evict::CacheEvictor;
use crate::cache::record::{
    GeometryData, GeometryRecord, IndexData, POSITION_ITEM_SIZE, RecordBuffers,
    TEXCOORD_ITEM_SIZE,
};
use crate::events::lifecycle::LifecycleEvent;
use crate::events::surface::SurfaceRegistry;
use crate::foundation::core::{GeometryId, LogicalTime, SurfaceId};
use crate::foundation::error::{GeomError, GeomResult};
use crate::gpu::buffer::GpuBuffer;
use crate::gpu::device::{BufferDesc, BufferTarget, GpuDevice};
use crate::memory::authority::{AllocationRequest, EvictorId, MemoryAuthority};
use crate::render::dispatch::BindMarker;
use crate::render::shader::ShaderStage;

/// Name the backend registers its evictor under.
pub const EVICTOR_NAME: &str = "geometry";

/// External collaborators a [`GeometryBackend`] drives.
pub struct Collaborators {
    /// Device that owns buffer memory and executes draws.
    pub device: Box<dyn GpuDevice>,
    /// Shader-composition stage receiving activation requests and geometry exports.
    pub shader: Box<dyn ShaderStage>,
    /// Surface-liveness query.
    pub surfaces: Box<dyn SurfaceRegistry>,
    /// Memory-pressure authority gating every buffer allocation.
    pub authority: Box<dyn MemoryAuthority>,
}

/// GPU geometry cache and draw dispatcher.
///
/// Owns every cached [`GeometryRecord`], the bind marker and the logical clock. All methods run
/// synchronously on the render thread; lifecycle notifications arrive through
/// [`GeometryBackend::handle_event`].
///
/// The records live in state shared with the evictor registered at construction, so any
/// subsystem allocating through the same memory authority can reclaim them.
pub struct GeometryBackend {
    pub(super) opts: BackendOpts,
    pub(super) state: SharedState,
    pub(super) shader: Box<dyn ShaderStage>,
    pub(super) authority: Box<dyn MemoryAuthority>,
    pub(super) evictor_id: EvictorId,
}

impl fmt::Debug for GeometryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryBackend")
            .field("opts", &self.opts)
            .field("state", &self.state)
            .field("evictor_id", &self.evictor_id)
            .finish_non_exhaustive()
    }
}

impl GeometryBackend {
    /// Validate `opts` and register the LRU evictor with the memory authority.
    pub fn new(opts: BackendOpts, collaborators: Collaborators) -> GeomResult<Self> {
        opts.validate()?;
        let Collaborators {
            device,
            shader,
            surfaces,
            mut authority,
        } = collaborators;
        let state = CacheState::new(device, surfaces).shared();
        let evictor_id = authority.register(EVICTOR_NAME, Box::new(CacheEvictor::new(&state)));
        Ok(Self {
            opts,
            state,
            shader,
            authority,
            evictor_id,
        })
    }

    /// Identifier of the record cached for `(surface, kind)`, if any.
    pub fn exists(&self, surface: SurfaceId, kind: &str) -> GeomResult<Option<GeometryId>> {
        let state = self.state.borrow();
        state.dispatch.require_surface()?;
        let id = GeometryId::new(surface, kind);
        Ok(state.cache.contains(&id).then_some(id))
    }

    /// Upload `data` and cache it under `(surface, kind)`.
    ///
    /// Every array is validated before anything else happens. Records left behind by surfaces
    /// that no longer exist are dropped, then an existing record under the same key is
    /// destroyed. Buffers are allocated vertex, normal, texcoord (if present), index; if any
    /// allocation fails the ones already made are released and no record is inserted.
    #[tracing::instrument(skip(self, data), fields(primitive = %data.primitive))]
    pub fn create(
        &mut self,
        surface: SurfaceId,
        kind: &str,
        data: &GeometryData,
    ) -> GeomResult<GeometryId> {
        self.state.borrow().dispatch.require_surface()?;
        let valid = data.validate()?;
        let id = GeometryId::new(surface, kind);

        self.purge_dead_surfaces();
        if self.destroy(&id) {
            let mut state = self.state.borrow_mut();
            state.stats.records_replaced = state.stats.records_replaced.saturating_add(1);
            tracing::debug!(%id, "replaced existing geometry");
        }

        let vertices = self
            .upload(&id, "vertices", BufferTarget::Array, valid.positions, POSITION_ITEM_SIZE)
            .inspect_err(|_| self.note_allocation_failure())?;

        let normals =
            match self.upload(&id, "normals", BufferTarget::Array, valid.normals, POSITION_ITEM_SIZE)
            {
                Ok(b) => b,
                Err(e) => return Err(self.unwind(e, [vertices])),
            };

        let texcoords = match valid.texcoords {
            None => None,
            Some(tc) => {
                match self.upload(&id, "texcoords", BufferTarget::Array, tc, TEXCOORD_ITEM_SIZE) {
                    Ok(b) => Some(b),
                    Err(e) => return Err(self.unwind(e, [vertices, normals])),
                }
            }
        };

        let indices = match valid.indices {
            IndexData::U16(v) => self.upload(&id, "indices", BufferTarget::ElementArray, v, 1),
            IndexData::U32(v) => self.upload(&id, "indices", BufferTarget::ElementArray, v, 1),
        };
        let indices = match indices {
            Ok(b) => b,
            Err(e) => {
                let staged = [Some(vertices), Some(normals), texcoords];
                return Err(self.unwind(e, staged.into_iter().flatten()));
            }
        };

        let mut state = self.state.borrow_mut();
        let record = GeometryRecord::new(
            id.clone(),
            valid.primitive,
            RecordBuffers {
                vertices,
                normals,
                texcoords,
                indices,
            },
            state.dispatch.clock,
            data.fixed,
        );
        tracing::debug!(%id, bytes = record.byte_len(), fixed = data.fixed, "cached geometry");
        state.cache.insert(record);
        state.stats.records_created = state.stats.records_created.saturating_add(1);
        Ok(id)
    }

    /// Remove `id` from the cache and free its buffers. Returns `false` if it was not cached.
    ///
    /// Device deletes are skipped when the owning surface is gone; the bytes are still returned
    /// to the memory authority.
    pub fn destroy(&mut self, id: &GeometryId) -> bool {
        let released = self.state.borrow_mut().remove(id);
        match released {
            Some(released) => {
                self.authority.release(released.bytes);
                true
            }
            None => false,
        }
    }

    /// Destroy every cached record.
    pub fn reset_all(&mut self) {
        let (count, bytes) = self.state.borrow_mut().remove_all();
        self.authority.release(bytes);
        tracing::debug!(records = count, bytes, "reset geometry cache");
    }

    /// Destroy every record whose surface is gone, without device calls, and return their bytes
    /// to the memory authority. Returns the number of records dropped.
    ///
    /// Runs on its own before each `create` and on surface activation changes.
    pub fn purge_dead_surfaces(&mut self) -> usize {
        let (count, bytes) = self.state.borrow_mut().remove_dead_surfaces();
        if count > 0 {
            self.authority.release(bytes);
            tracing::debug!(records = count, bytes, "dropped geometry of vanished surfaces");
        }
        count
    }

    /// Mark `id` as fixed (kept after drawing) or single-use.
    pub fn set_fixed(&mut self, id: &GeometryId, fixed: bool) -> GeomResult<()> {
        let mut state = self.state.borrow_mut();
        let record = state
            .cache
            .get_mut(id)
            .ok_or_else(|| GeomError::UnknownGeometry(id.clone()))?;
        record.set_fixed(fixed);
        Ok(())
    }

    /// Evict the least-recently-used eligible record, as the memory authority would.
    ///
    /// Returns `false` when no record qualifies.
    pub fn evict_lru(&mut self) -> bool {
        let freed = self.state.borrow_mut().evict_lru();
        match freed {
            Some(bytes) => {
                self.authority.release(bytes);
                true
            }
            None => {
                tracing::warn!(records = self.len(), "no geometry eligible for eviction");
                false
            }
        }
    }

    /// React to a lifecycle notification.
    pub fn handle_event(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Tick(now) => {
                let mut state = self.state.borrow_mut();
                if !state.dispatch.advance_clock(now) {
                    tracing::debug!(
                        now = now.0,
                        clock = state.dispatch.clock.0,
                        "ignored stale clock tick"
                    );
                }
            }
            LifecycleEvent::SurfaceActivated(surface) => {
                self.state.borrow_mut().dispatch.active_surface = Some(surface);
                self.purge_dead_surfaces();
            }
            LifecycleEvent::SurfaceDeactivated => {
                self.state.borrow_mut().dispatch.active_surface = None;
                self.purge_dead_surfaces();
            }
            LifecycleEvent::ShaderActivated
            | LifecycleEvent::ShaderDeactivated
            | LifecycleEvent::SceneActivated
            | LifecycleEvent::SceneDeactivated => {}
            LifecycleEvent::GlobalReset => self.reset_all(),
        }
        if event.invalidates_binding() {
            self.state.borrow_mut().dispatch.unbind();
        }
    }

    /// Lifetime counters.
    pub fn stats(&self) -> BackendStats {
        self.state.borrow().stats
    }

    /// Options in effect.
    pub fn opts(&self) -> &BackendOpts {
        &self.opts
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.state.borrow().cache.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().cache.is_empty()
    }

    /// Read access to one record.
    ///
    /// The guard borrows the cache; drop it before calling back into the backend.
    pub fn record(&self, id: &GeometryId) -> Option<Ref<'_, GeometryRecord>> {
        Ref::filter_map(self.state.borrow(), |state| state.cache.get(id)).ok()
    }

    /// Cached ids in key order.
    pub fn ids(&self) -> Vec<GeometryId> {
        self.state.borrow().cache.ids().cloned().collect()
    }

    /// Surface set by the last activation, if still active.
    pub fn active_surface(&self) -> Option<SurfaceId> {
        self.state.borrow().dispatch.active_surface
    }

    /// Latest logical clock value.
    pub fn clock(&self) -> LogicalTime {
        self.state.borrow().dispatch.clock
    }

    /// Geometry whose buffers are currently bound.
    pub fn bound(&self) -> Option<GeometryId> {
        self.state.borrow().dispatch.marker.bound().cloned()
    }

    /// Full bind-marker state.
    pub fn marker(&self) -> BindMarker {
        self.state.borrow().dispatch.marker.clone()
    }

    /// Evictor slot registered with the memory authority.
    pub fn evictor_id(&self) -> EvictorId {
        self.evictor_id
    }

    /// Pass the allocation gate, then upload `data` to the device.
    fn upload<T: bytemuck::Pod>(
        &mut self,
        id: &GeometryId,
        role: &str,
        target: BufferTarget,
        data: &[T],
        item_size: u32,
    ) -> GeomResult<GpuBuffer> {
        let what = format!("{id} {role}");
        let bytes = GpuBuffer::byte_len_of(data);
        let request = AllocationRequest {
            requester: self.evictor_id,
            description: &what,
            bytes,
        };
        // The authority may call back into our evictor: no state borrow is live here.
        if !self.authority.reserve(&request) {
            return Err(GeomError::allocation(what, "memory authority refused the request"));
        }

        let desc = BufferDesc {
            label: &what,
            target,
            usage: self.opts.buffer_usage,
        };
        let mut state = self.state.borrow_mut();
        match GpuBuffer::upload(&mut *state.device, &desc, data, item_size) {
            Ok(buffer) => {
                state.stats.note_allocated(bytes);
                Ok(buffer)
            }
            Err(e) => {
                self.authority.release(bytes);
                Err(GeomError::allocation(what, format!("{e:#}")))
            }
        }
    }

    /// Free buffers staged by a failed `create` and pass its error through.
    fn unwind(
        &mut self,
        err: GeomError,
        staged: impl IntoIterator<Item = GpuBuffer>,
    ) -> GeomError {
        self.note_allocation_failure();
        let mut state = self.state.borrow_mut();
        let mut freed = 0u64;
        for buffer in staged {
            let bytes = buffer.release(&mut *state.device);
            state.stats.note_unwound(bytes);
            freed += bytes;
        }
        drop(state);
        self.authority.release(freed);
        tracing::warn!(error = %err, freed, "geometry creation unwound");
        err
    }

    fn note_allocation_failure(&mut self) {
        let mut state = self.state.borrow_mut();
        state.stats.allocation_failures = state.stats.allocation_failures.saturating_add(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/geometry_backend.rs"]
mod tests;
