use crate::foundation::core::{IndexFormat, PrimitiveKind};

/// Opaque device handle of one uploaded buffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct BufferHandle(pub u64);

/// Binding target of a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// Usage hint passed to the device on upload.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    #[default]
    Static,
    /// Modified repeatedly, drawn many times.
    Dynamic,
    /// Uploaded once, drawn a few times.
    Stream,
}

/// Parameters of a single buffer upload.
#[derive(Clone, Copy, Debug)]
pub struct BufferDesc<'a> {
    /// Human-readable label, also used as the allocation gate description.
    pub label: &'a str,
    /// Binding target.
    pub target: BufferTarget,
    /// Usage hint.
    pub usage: BufferUsage,
}

/// The device-level command surface the backend drives.
///
/// Implementations wrap a real graphics context; [`crate::HeadlessDevice`] records commands
/// instead. Every method is called on the render thread, never reentrantly.
pub trait GpuDevice {
    /// Upload `contents` into a new device buffer.
    fn create_buffer(
        &mut self,
        desc: &BufferDesc<'_>,
        contents: &[u8],
    ) -> anyhow::Result<BufferHandle>;

    /// Free a buffer previously returned by [`GpuDevice::create_buffer`].
    fn delete_buffer(&mut self, handle: BufferHandle);

    /// Disable one generic vertex attribute slot.
    fn disable_vertex_attrib(&mut self, slot: u32);

    /// Bind an element-array buffer for the next indexed draw.
    fn bind_index_buffer(&mut self, handle: BufferHandle);

    /// Issue an indexed draw with the currently bound state.
    fn draw_elements(&mut self, primitive: PrimitiveKind, index_count: u32, format: IndexFormat);

    /// Flush the command stream.
    fn flush(&mut self);
}
