use super::*;
use crate::cache::testing::triangle_record;
use crate::cache::store::GeometryCache;
use crate::events::surface::SurfaceTable;
use crate::foundation::core::SurfaceId;
use crate::gpu::headless::{DeviceCommand, HeadlessDevice};

fn cache_with(dev: &mut HeadlessDevice, entries: &[(u64, &str, u64)]) -> GeometryCache {
    let mut cache = GeometryCache::new();
    for &(surface, kind, last_used) in entries {
        cache.insert(triangle_record(dev, surface, kind, last_used));
    }
    cache
}

fn id(surface: u64, kind: &str) -> GeometryId {
    GeometryId::new(SurfaceId(surface), kind)
}

#[test]
fn picks_oldest() {
    let mut dev = HeadlessDevice::new();
    let cache = cache_with(&mut dev, &[(1, "a", 20), (1, "b", 10)]);
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1)]);
    assert_eq!(select_lru(cache.iter(), None, &surfaces), Some(&id(1, "b")));
}

#[test]
fn ties_go_to_first_in_key_order() {
    let mut dev = HeadlessDevice::new();
    let cache = cache_with(&mut dev, &[(1, "z", 5), (1, "m", 5), (2, "a", 5)]);
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1), SurfaceId(2)]);
    assert_eq!(select_lru(cache.iter(), None, &surfaces), Some(&id(1, "m")));
}

#[test]
fn bound_and_dead_surface_records_are_skipped() {
    let mut dev = HeadlessDevice::new();
    let cache = cache_with(&mut dev, &[(1, "bound", 1), (2, "orphan", 2), (1, "other", 3)]);
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1)]);
    let bound = id(1, "bound");
    assert_eq!(
        select_lru(cache.iter(), Some(&bound), &surfaces),
        Some(&id(1, "other"))
    );

    let only_bound = cache_with(&mut dev, &[(1, "bound", 1)]);
    assert_eq!(select_lru(only_bound.iter(), Some(&bound), &surfaces), None);
}

fn shared_state(dev: &mut HeadlessDevice, entries: &[(u64, &str, u64)]) -> SharedState {
    let mut state = CacheState::new(
        Box::new(dev.clone()),
        Box::new(SurfaceTable::with_surfaces([SurfaceId(1)])),
    );
    state.cache = cache_with(dev, entries);
    state.shared()
}

#[test]
fn evictor_frees_one_record_per_call() {
    let mut dev = HeadlessDevice::new();
    let state = shared_state(&mut dev, &[(1, "a", 20), (1, "b", 10)]);
    let live_before = dev.live_buffers();

    let mut ev = CacheEvictor::new(&state);
    // 9 + 9 floats and 3 u16 indices.
    assert_eq!(ev.evict_one(), Some(36 + 36 + 6));
    assert_eq!(ev.evict_one(), Some(78));
    assert_eq!(ev.evict_one(), None);

    let state = state.borrow();
    assert!(state.cache.is_empty());
    assert_eq!(state.stats.evictions, 2);
    assert_eq!(state.stats.records_destroyed, 2);
    assert_eq!(state.stats.buffers_released, 6);
    assert_eq!(dev.live_buffers(), live_before - 6);
    assert_eq!(dev.double_deletes(), 0);
}

#[test]
fn evictor_order_follows_last_used() {
    let mut dev = HeadlessDevice::new();
    let state = shared_state(&mut dev, &[(1, "a", 20), (1, "b", 10)]);
    CacheEvictor::new(&state).evict_one();

    let state = state.borrow();
    assert!(state.cache.contains(&id(1, "a")));
    assert!(!state.cache.contains(&id(1, "b")));
}

#[test]
fn evictor_leaves_the_bound_record() {
    let mut dev = HeadlessDevice::new();
    let state = shared_state(&mut dev, &[(1, "a", 20), (1, "b", 10)]);
    state.borrow_mut().dispatch.bind(id(1, "b"));

    let mut ev = CacheEvictor::new(&state);
    assert_eq!(ev.evict_one(), Some(78));
    assert_eq!(ev.evict_one(), None);
    assert!(state.borrow().cache.contains(&id(1, "b")));
}

#[test]
fn busy_or_dropped_state_offers_nothing() {
    let mut dev = HeadlessDevice::new();
    let state = shared_state(&mut dev, &[(1, "a", 20)]);
    let mut ev = CacheEvictor::new(&state);

    let guard = state.borrow();
    assert_eq!(ev.evict_one(), None);
    drop(guard);

    drop(state);
    assert_eq!(ev.evict_one(), None);
    assert_eq!(dev.count(|c| matches!(c, DeviceCommand::DeleteBuffer(_))), 0);
}
