use super::*;
use crate::gpu::headless::HeadlessDevice;

fn desc(label: &str, target: BufferTarget) -> BufferDesc<'_> {
    BufferDesc {
        label,
        target,
        usage: BufferUsage::Static,
    }
}

#[test]
fn upload_records_layout() {
    let mut dev = HeadlessDevice::new();
    let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let buf = GpuBuffer::upload(&mut dev, &desc("pos", BufferTarget::Array), &positions, 3)
        .unwrap();

    assert_eq!(buf.count(), 3);
    assert_eq!(buf.item_size(), 3);
    assert_eq!(buf.component_bytes(), 4);
    assert_eq!(buf.byte_len(), 36);
    assert_eq!(buf.index_format(), None);
    assert!(dev.is_live(buf.handle()));
}

#[test]
fn index_format_follows_component_width() {
    let mut dev = HeadlessDevice::new();
    let short = GpuBuffer::upload(
        &mut dev,
        &desc("i16", BufferTarget::ElementArray),
        &[0u16, 1, 2],
        1,
    )
    .unwrap();
    let wide = GpuBuffer::upload(
        &mut dev,
        &desc("i32", BufferTarget::ElementArray),
        &[0u32, 1, 2],
        1,
    )
    .unwrap();

    assert_eq!(short.index_format(), Some(IndexFormat::Uint16));
    assert_eq!(wide.index_format(), Some(IndexFormat::Uint32));
    assert_eq!(wide.byte_len(), 12);
}

#[test]
fn release_deletes_once_and_abandon_skips_device() {
    let mut dev = HeadlessDevice::new();
    let a = GpuBuffer::upload(&mut dev, &desc("a", BufferTarget::Array), &[1.0f32, 2.0], 2)
        .unwrap();
    let b = GpuBuffer::upload(&mut dev, &desc("b", BufferTarget::Array), &[1.0f32, 2.0], 2)
        .unwrap();
    let b_handle = b.handle();

    assert_eq!(a.release(&mut dev), 8);
    assert_eq!(b.abandon(), 8);

    assert_eq!(dev.live_buffers(), 1);
    assert!(dev.is_live(b_handle));
    assert_eq!(dev.double_deletes(), 0);
}

#[test]
fn byte_len_of_matches_upload() {
    let data = [0u16; 6];
    assert_eq!(GpuBuffer::byte_len_of(&data), 12);
}
