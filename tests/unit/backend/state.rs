use super::*;
use crate::cache::testing::triangle_record;
use crate::events::surface::SurfaceTable;
use crate::foundation::core::SurfaceId;
use crate::gpu::headless::{DeviceCommand, HeadlessDevice};

fn state_with(dev: &mut HeadlessDevice, surfaces: &SurfaceTable) -> CacheState {
    let mut state = CacheState::new(Box::new(dev.clone()), Box::new(surfaces.clone()));
    for (surface, kind) in [(1, "a"), (2, "a"), (2, "b")] {
        state.cache.insert(triangle_record(dev, surface, kind, 0));
    }
    state
}

#[test]
fn dead_surface_records_go_without_device_deletes() {
    let mut dev = HeadlessDevice::new();
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1), SurfaceId(2)]);
    let mut state = state_with(&mut dev, &surfaces);
    assert_eq!(state.remove_dead_surfaces(), (0, 0));

    surfaces.remove(SurfaceId(2));
    assert_eq!(state.remove_dead_surfaces(), (2, 2 * 78));
    assert_eq!(state.cache.len(), 1);
    assert!(state.cache.contains(&GeometryId::new(SurfaceId(1), "a")));
    assert_eq!(dev.count(|c| matches!(c, DeviceCommand::DeleteBuffer(_))), 0);
    assert_eq!(state.stats.buffer_releases_skipped, 6);
    assert_eq!(state.stats.records_destroyed, 2);
}

#[test]
fn remove_clears_only_its_own_binding() {
    let mut dev = HeadlessDevice::new();
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1), SurfaceId(2)]);
    let mut state = state_with(&mut dev, &surfaces);
    let bound = GeometryId::new(SurfaceId(1), "a");
    state.dispatch.bind(bound.clone());

    assert_eq!(state.remove(&GeometryId::new(SurfaceId(2), "b")).map(|r| r.bytes), Some(78));
    assert!(state.dispatch.marker.is_bound_to(&bound));
    assert!(state.remove(&bound).is_some());
    assert_eq!(state.dispatch.marker.bound(), None);
    assert!(state.remove(&bound).is_none());
}

#[test]
fn remove_all_reports_every_byte() {
    let mut dev = HeadlessDevice::new();
    let surfaces = SurfaceTable::with_surfaces([SurfaceId(1), SurfaceId(2)]);
    let mut state = state_with(&mut dev, &surfaces);
    state.dispatch.bind(GeometryId::new(SurfaceId(2), "a"));

    assert_eq!(state.remove_all(), (3, 3 * 78));
    assert!(state.cache.is_empty());
    assert_eq!(state.dispatch.marker.bound(), None);
    assert_eq!(dev.live_buffers(), 0);
    assert!(format!("{:?}", state.shared()).contains("records: 0"));
}
