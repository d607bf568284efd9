use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::foundation::core::{IndexFormat, PrimitiveKind};
use crate::gpu::device::{BufferDesc, BufferHandle, BufferTarget, GpuDevice};

/// One command observed by a [`HeadlessDevice`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCommand {
    /// A buffer was created.
    CreateBuffer {
        /// Assigned handle.
        handle: BufferHandle,
        /// Upload label.
        label: String,
        /// Binding target.
        target: BufferTarget,
        /// Uploaded bytes.
        bytes: u64,
    },
    /// A buffer was deleted.
    DeleteBuffer(BufferHandle),
    /// A vertex attribute slot was disabled.
    DisableVertexAttrib(u32),
    /// An index buffer was bound.
    BindIndexBuffer(BufferHandle),
    /// An indexed draw was issued.
    DrawElements {
        /// Topology.
        primitive: PrimitiveKind,
        /// Number of indices.
        count: u32,
        /// Index element type.
        format: IndexFormat,
    },
    /// The command stream was flushed.
    Flush,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: u64,
    live: BTreeMap<BufferHandle, u64>,
    commands: Vec<DeviceCommand>,
    double_deletes: u64,
    // Countdown of successful creations before the next one fails.
    fail_after: Option<usize>,
}

/// Device that records commands instead of talking to a GPU.
///
/// Clones share state, so a host (or a test) can keep a handle for inspection after moving
/// one into the backend.
#[derive(Clone, Debug, Default)]
pub struct HeadlessDevice {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessDevice {
    /// Empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the buffer creation after `successes` more successful ones fail.
    pub fn fail_after(&self, successes: usize) {
        self.state.borrow_mut().fail_after = Some(successes);
    }

    /// Number of buffers currently alive on the device.
    pub fn live_buffers(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Bytes currently alive on the device.
    pub fn live_bytes(&self) -> u64 {
        self.state.borrow().live.values().sum()
    }

    /// Whether `handle` is alive.
    pub fn is_live(&self, handle: BufferHandle) -> bool {
        self.state.borrow().live.contains_key(&handle)
    }

    /// Deletions of handles that were not alive. Always zero for a correct backend.
    pub fn double_deletes(&self) -> u64 {
        self.state.borrow().double_deletes
    }

    /// Snapshot of every recorded command.
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state.borrow().commands.clone()
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DeviceCommand) -> bool) -> usize {
        self.state.borrow().commands.iter().filter(|c| pred(c)).count()
    }

    /// Forget recorded commands; live buffers are kept.
    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }
}

impl GpuDevice for HeadlessDevice {
    fn create_buffer(
        &mut self,
        desc: &BufferDesc<'_>,
        contents: &[u8],
    ) -> anyhow::Result<BufferHandle> {
        let mut st = self.state.borrow_mut();
        if let Some(n) = st.fail_after {
            if n == 0 {
                st.fail_after = None;
                anyhow::bail!("headless device refused '{}'", desc.label);
            }
            st.fail_after = Some(n - 1);
        }

        st.next_handle += 1;
        let handle = BufferHandle(st.next_handle);
        let bytes = contents.len() as u64;
        st.live.insert(handle, bytes);
        st.commands.push(DeviceCommand::CreateBuffer {
            handle,
            label: desc.label.to_string(),
            target: desc.target,
            bytes,
        });
        Ok(handle)
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        let mut st = self.state.borrow_mut();
        if st.live.remove(&handle).is_none() {
            st.double_deletes += 1;
        }
        st.commands.push(DeviceCommand::DeleteBuffer(handle));
    }

    fn disable_vertex_attrib(&mut self, slot: u32) {
        self.state
            .borrow_mut()
            .commands
            .push(DeviceCommand::DisableVertexAttrib(slot));
    }

    fn bind_index_buffer(&mut self, handle: BufferHandle) {
        self.state
            .borrow_mut()
            .commands
            .push(DeviceCommand::BindIndexBuffer(handle));
    }

    fn draw_elements(&mut self, primitive: PrimitiveKind, count: u32, format: IndexFormat) {
        self.state
            .borrow_mut()
            .commands
            .push(DeviceCommand::DrawElements {
                primitive,
                count,
                format,
            });
    }

    fn flush(&mut self) {
        self.state.borrow_mut().commands.push(DeviceCommand::Flush);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/headless.rs"]
mod tests;
