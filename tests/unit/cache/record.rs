use super::*;
use crate::gpu::device::{BufferDesc, BufferTarget, BufferUsage};
use crate::gpu::headless::HeadlessDevice;

fn triangle() -> GeometryData {
    GeometryData::new("TRIANGLES")
        .with_positions(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
        .with_normals(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
        .with_indices(IndexData::U16(vec![0, 1, 2]))
}

fn upload(dev: &mut HeadlessDevice, label: &str, target: BufferTarget, data: &[f32], item: u32) -> GpuBuffer {
    let desc = BufferDesc {
        label,
        target,
        usage: BufferUsage::Static,
    };
    GpuBuffer::upload(dev, &desc, data, item).unwrap()
}

fn record_on(dev: &mut HeadlessDevice, with_texcoords: bool) -> GeometryRecord {
    let vertices = upload(dev, "v", BufferTarget::Array, &[0.0; 9], 3);
    let normals = upload(dev, "n", BufferTarget::Array, &[0.0; 9], 3);
    let texcoords = with_texcoords.then(|| upload(dev, "t", BufferTarget::Array, &[0.0; 6], 2));
    let indices = GpuBuffer::upload(
        dev,
        &BufferDesc {
            label: "i",
            target: BufferTarget::ElementArray,
            usage: BufferUsage::Static,
        },
        &[0u16, 1, 2],
        1,
    )
    .unwrap();
    GeometryRecord::new(
        GeometryId::new(SurfaceId(1), "tri"),
        PrimitiveKind::Triangles,
        RecordBuffers {
            vertices,
            normals,
            texcoords,
            indices,
        },
        LogicalTime(5),
        true,
    )
}

#[test]
fn valid_triangle_passes() {
    let data = triangle();
    let v = data.validate().unwrap();
    assert_eq!(v.primitive, PrimitiveKind::Triangles);
    assert_eq!(v.positions.len(), 9);
    assert!(v.texcoords.is_none());
    assert_eq!(v.indices.format(), IndexFormat::Uint16);
}

#[test]
fn primitive_is_checked_first() {
    let mut data = triangle();
    data.primitive = "hexagon".to_string();
    data.positions = None;
    assert!(matches!(
        data.validate(),
        Err(GeomError::InvalidPrimitiveKind(_))
    ));
}

#[test]
fn missing_arrays_are_named() {
    let mut data = triangle();
    data.normals = None;
    assert!(matches!(
        data.validate(),
        Err(GeomError::MissingRequiredData("normals"))
    ));

    let mut data = triangle();
    data.indices = None;
    assert!(matches!(
        data.validate(),
        Err(GeomError::MissingRequiredData("indices"))
    ));

    let data = GeometryData::new("points");
    assert!(matches!(
        data.validate(),
        Err(GeomError::MissingRequiredData("positions"))
    ));
}

#[test]
fn malformed_arrays_are_invalid_data() {
    let data = triangle().with_positions(vec![0.0; 8]);
    assert!(matches!(data.validate(), Err(GeomError::InvalidData(_))));

    let data = triangle().with_normals(vec![0.0; 6]);
    assert!(matches!(data.validate(), Err(GeomError::InvalidData(_))));

    let data = triangle().with_texcoords(vec![0.0; 4]);
    assert!(matches!(data.validate(), Err(GeomError::InvalidData(_))));

    let data = triangle().with_indices(IndexData::U32(vec![0, 1, 3]));
    assert!(matches!(data.validate(), Err(GeomError::InvalidData(_))));

    let data = triangle().with_indices(IndexData::U16(vec![]));
    assert!(matches!(data.validate(), Err(GeomError::InvalidData(_))));
}

#[test]
fn data_deserializes_with_fixed_default() {
    let json = r#"{
        "primitive": "TRIANGLES",
        "positions": [0,0,0, 1,0,0, 0,1,0],
        "normals": [0,0,1, 0,0,1, 0,0,1],
        "indices": { "u32": [0, 1, 2] }
    }"#;
    let data: GeometryData = serde_json::from_str(json).unwrap();
    assert!(data.fixed);
    assert!(data.texcoords.is_none());
    assert_eq!(data.indices.as_ref().map(IndexData::format), Some(IndexFormat::Uint32));
    assert!(data.validate().is_ok());
}

#[test]
fn record_reports_layout_and_bytes() {
    let mut dev = HeadlessDevice::new();
    let rec = record_on(&mut dev, true);

    assert_eq!(rec.index_count(), 3);
    assert_eq!(rec.surface(), SurfaceId(1));
    assert_eq!(rec.last_used(), LogicalTime(5));
    assert_eq!(rec.byte_len(), 36 + 36 + 24 + 6);
    assert_eq!(rec.indices().index_format(), Some(IndexFormat::Uint16));
    assert_eq!(rec.texcoords().map(GpuBuffer::item_size), Some(2));
}

#[test]
fn release_frees_every_buffer_on_live_surface() {
    let mut dev = HeadlessDevice::new();
    let rec = record_on(&mut dev, true);
    let bytes = rec.byte_len();

    let out = rec.release(&mut dev, true);
    assert_eq!(out.buffers, 4);
    assert_eq!(out.skipped, 0);
    assert_eq!(out.bytes, bytes);
    assert_eq!(dev.live_buffers(), 0);
}

#[test]
fn release_skips_device_when_surface_is_gone() {
    let mut dev = HeadlessDevice::new();
    let rec = record_on(&mut dev, false);

    let out = rec.release(&mut dev, false);
    assert_eq!(out.buffers, 3);
    assert_eq!(out.skipped, 3);
    assert_eq!(dev.live_buffers(), 3);
    assert_eq!(dev.double_deletes(), 0);
}
