use std::collections::BTreeMap;

use crate::cache::record::GeometryRecord;
use crate::foundation::core::GeometryId;

/// Keyed store of geometry records.
///
/// Enumeration order is key order: surface first, then type string.
#[derive(Debug, Default)]
pub(crate) struct GeometryCache {
    records: BTreeMap<GeometryId, GeometryRecord>,
}

impl GeometryCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, id: &GeometryId) -> Option<&GeometryRecord> {
        self.records.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &GeometryId) -> Option<&mut GeometryRecord> {
        self.records.get_mut(id)
    }

    pub(crate) fn contains(&self, id: &GeometryId) -> bool {
        self.records.contains_key(id)
    }

    /// Insert `record` under its own id, handing back whatever was stored there before.
    pub(crate) fn insert(&mut self, record: GeometryRecord) -> Option<GeometryRecord> {
        self.records.insert(record.id().clone(), record)
    }

    pub(crate) fn remove(&mut self, id: &GeometryId) -> Option<GeometryRecord> {
        self.records.remove(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &GeometryRecord> {
        self.records.values()
    }

    pub(crate) fn ids(&self) -> impl Iterator<Item = &GeometryId> {
        self.records.keys()
    }

    /// Empty the store, yielding every record in key order.
    pub(crate) fn take_all(&mut self) -> Vec<GeometryRecord> {
        std::mem::take(&mut self.records).into_values().collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
