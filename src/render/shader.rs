use std::cell::RefCell;
use std::rc::Rc;

use crate::cache::record::GeometryRecord;
use crate::foundation::core::{GeometryId, IndexFormat, PrimitiveKind};
use crate::gpu::buffer::GpuBuffer;
use crate::gpu::device::BufferHandle;

/// Answer of the shader stage to an activation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderActivation {
    /// The current program was already active; nothing changed.
    AlreadyActive,
    /// A program was (re)activated; previously exported attribute pointers are stale.
    Activated,
}

/// Buffers and metadata of one record, as handed to the shader stage for attribute binding.
#[derive(Clone, Copy, Debug)]
pub struct GeometryExport<'a> {
    /// Geometry being exported.
    pub id: &'a GeometryId,
    /// Topology.
    pub primitive: PrimitiveKind,
    /// Position buffer.
    pub vertices: &'a GpuBuffer,
    /// Normal buffer.
    pub normals: &'a GpuBuffer,
    /// Texcoord buffer, if any.
    pub texcoords: Option<&'a GpuBuffer>,
    /// Index buffer.
    pub indices: &'a GpuBuffer,
}

impl<'a> GeometryExport<'a> {
    pub(crate) fn of(record: &'a GeometryRecord) -> Self {
        Self {
            id: record.id(),
            primitive: record.primitive(),
            vertices: record.vertices(),
            normals: record.normals(),
            texcoords: record.texcoords(),
            indices: record.indices(),
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.count()
    }

    /// Number of indices.
    pub fn index_count(&self) -> u32 {
        self.indices.count()
    }
}

/// Outbound channel to the shader-composition collaborator.
pub trait ShaderStage {
    /// Ensure a shader program is active. Sent before every draw.
    fn request_activation(&mut self) -> ShaderActivation;

    /// Bind attribute pointers for `export`. Sent only when the bound geometry changes.
    fn export_geometry(&mut self, export: &GeometryExport<'_>);
}

/// What a [`RecordingShaderStage`] kept from one export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    /// Exported geometry.
    pub id: GeometryId,
    /// Topology.
    pub primitive: PrimitiveKind,
    /// Vertices in the position buffer.
    pub vertex_count: u32,
    /// Indices in the index buffer.
    pub index_count: u32,
    /// Index element type.
    pub index_format: Option<IndexFormat>,
    /// Handles in export order: vertices, normals, texcoords (if any), indices.
    pub handles: Vec<BufferHandle>,
}

#[derive(Debug, Default)]
struct RecordingState {
    active: bool,
    requests: u64,
    activations: u64,
    exports: Vec<ExportSummary>,
}

/// Shader stage that tracks a single program and records every export.
///
/// The first activation request reports [`ShaderActivation::Activated`]; later ones report
/// [`ShaderActivation::AlreadyActive`] until [`RecordingShaderStage::drop_program`] is called.
/// Clones share state.
#[derive(Clone, Debug, Default)]
pub struct RecordingShaderStage {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingShaderStage {
    /// Stage with no program active yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage whose program counts as already active.
    pub fn already_active() -> Self {
        let stage = Self::new();
        stage.state.borrow_mut().active = true;
        stage
    }

    /// Forget the active program, as after a context loss.
    pub fn drop_program(&self) {
        self.state.borrow_mut().active = false;
    }

    /// Activation requests received.
    pub fn activation_requests(&self) -> u64 {
        self.state.borrow().requests
    }

    /// Requests that actually (re)activated the program.
    pub fn activations(&self) -> u64 {
        self.state.borrow().activations
    }

    /// Number of exports received.
    pub fn export_count(&self) -> usize {
        self.state.borrow().exports.len()
    }

    /// Snapshot of every export.
    pub fn exports(&self) -> Vec<ExportSummary> {
        self.state.borrow().exports.clone()
    }
}

impl ShaderStage for RecordingShaderStage {
    fn request_activation(&mut self) -> ShaderActivation {
        let mut st = self.state.borrow_mut();
        st.requests += 1;
        if st.active {
            ShaderActivation::AlreadyActive
        } else {
            st.active = true;
            st.activations += 1;
            ShaderActivation::Activated
        }
    }

    fn export_geometry(&mut self, export: &GeometryExport<'_>) {
        let handles = [
            Some(export.vertices),
            Some(export.normals),
            export.texcoords,
            Some(export.indices),
        ]
        .into_iter()
        .flatten()
        .map(GpuBuffer::handle)
        .collect();
        self.state.borrow_mut().exports.push(ExportSummary {
            id: export.id.clone(),
            primitive: export.primitive,
            vertex_count: export.vertex_count(),
            index_count: export.index_count(),
            index_format: export.indices.index_format(),
            handles,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/shader.rs"]
mod tests;
