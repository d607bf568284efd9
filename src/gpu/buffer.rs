use crate::foundation::core::IndexFormat;
use crate::gpu::device::{BufferDesc, BufferHandle, BufferTarget, BufferUsage, GpuDevice};

/// One uploaded array or index buffer.
///
/// Owned by exactly one geometry record. Releasing consumes the value, so a buffer can be
/// freed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct GpuBuffer {
    handle: BufferHandle,
    target: BufferTarget,
    usage: BufferUsage,
    count: u32,
    item_size: u32,
    component_bytes: u32,
    byte_len: u64,
}

impl GpuBuffer {
    /// Byte length `data` will occupy once uploaded.
    pub(crate) fn byte_len_of<T: bytemuck::Pod>(data: &[T]) -> u64 {
        std::mem::size_of_val(data) as u64
    }

    /// Upload `data`, grouped in elements of `item_size` components.
    ///
    /// `data.len()` must be a multiple of `item_size`; callers validate this beforehand.
    pub(crate) fn upload<T: bytemuck::Pod>(
        device: &mut dyn GpuDevice,
        desc: &BufferDesc<'_>,
        data: &[T],
        item_size: u32,
    ) -> anyhow::Result<Self> {
        debug_assert!(item_size > 0 && data.len() % item_size as usize == 0);
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let handle = device.create_buffer(desc, bytes)?;
        Ok(Self {
            handle,
            target: desc.target,
            usage: desc.usage,
            count: (data.len() / item_size as usize) as u32,
            item_size,
            component_bytes: std::mem::size_of::<T>() as u32,
            byte_len: bytes.len() as u64,
        })
    }

    /// Delete the device buffer. Returns the bytes that were resident.
    pub(crate) fn release(self, device: &mut dyn GpuDevice) -> u64 {
        device.delete_buffer(self.handle);
        self.byte_len
    }

    /// Drop the buffer without touching the device.
    ///
    /// Used when the owning surface is gone and its context already freed the memory.
    pub(crate) fn abandon(self) -> u64 {
        self.byte_len
    }

    /// Device handle.
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// Binding target.
    pub fn target(&self) -> BufferTarget {
        self.target
    }

    /// Usage hint given at upload.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Number of elements (vertices, or indices for an index buffer).
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Components per element (3 for positions, 2 for texcoords, 1 for indices).
    pub fn item_size(&self) -> u32 {
        self.item_size
    }

    /// Size in bytes of one component.
    pub fn component_bytes(&self) -> u32 {
        self.component_bytes
    }

    /// Total uploaded bytes.
    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    /// Index element type, for element-array buffers with a 2- or 4-byte width.
    pub fn index_format(&self) -> Option<IndexFormat> {
        match self.target {
            BufferTarget::ElementArray => IndexFormat::from_element_width(self.component_bytes),
            BufferTarget::Array => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/buffer.rs"]
mod tests;
