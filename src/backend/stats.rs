use crate::cache::record::Released;

/// Counters accumulated by a [`crate::GeometryBackend`] over its lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BackendStats {
    /// Records inserted by successful `create` calls.
    pub records_created: u64,
    /// Records removed for any reason (destroy, eviction, reset, transient draw, replacement).
    pub records_destroyed: u64,
    /// `create` calls that destroyed an existing record under the same key.
    pub records_replaced: u64,
    /// Records removed by LRU eviction.
    pub evictions: u64,
    /// Device buffers created.
    pub buffers_allocated: u64,
    /// Device buffers deleted.
    pub buffers_released: u64,
    /// Buffers dropped without a device call because their surface was gone.
    pub buffer_releases_skipped: u64,
    /// `create` calls that failed while allocating.
    pub allocation_failures: u64,
    /// Successful draws.
    pub draws: u64,
    /// Geometry exports sent to the shader stage.
    pub exports: u64,
    /// Draws that reused the bound geometry.
    pub fast_path_draws: u64,
    /// Single-use records destroyed right after their draw.
    pub transient_destroyed: u64,
    /// Bytes currently held by cached records.
    pub resident_bytes: u64,
}

impl BackendStats {
    pub(crate) fn note_allocated(&mut self, bytes: u64) {
        self.buffers_allocated = self.buffers_allocated.saturating_add(1);
        self.resident_bytes = self.resident_bytes.saturating_add(bytes);
    }

    /// A buffer of a record that never made it into the cache was freed.
    pub(crate) fn note_unwound(&mut self, bytes: u64) {
        self.buffers_released = self.buffers_released.saturating_add(1);
        self.resident_bytes = self.resident_bytes.saturating_sub(bytes);
    }

    pub(crate) fn note_record_released(&mut self, released: &Released) {
        self.records_destroyed = self.records_destroyed.saturating_add(1);
        self.buffers_released = self
            .buffers_released
            .saturating_add(released.buffers - released.skipped);
        self.buffer_releases_skipped = self
            .buffer_releases_skipped
            .saturating_add(released.skipped);
        self.resident_bytes = self.resident_bytes.saturating_sub(released.bytes);
    }
}
