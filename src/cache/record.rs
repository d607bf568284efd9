use crate::foundation::core::{GeometryId, IndexFormat, LogicalTime, PrimitiveKind, SurfaceId};
use crate::foundation::error::{GeomError, GeomResult};
use crate::gpu::buffer::GpuBuffer;
use crate::gpu::device::GpuDevice;

/// Components per position / normal element.
pub(crate) const POSITION_ITEM_SIZE: u32 = 3;
/// Components per texcoord element.
pub(crate) const TEXCOORD_ITEM_SIZE: u32 = 2;

/// Index list in either width. The width selects the draw-time index format.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexData {
    /// 16-bit indices.
    U16(Vec<u16>),
    /// 32-bit indices.
    U32(Vec<u32>),
}

impl IndexData {
    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index format matching the element width.
    pub fn format(&self) -> IndexFormat {
        match self {
            IndexData::U16(_) => IndexFormat::Uint16,
            IndexData::U32(_) => IndexFormat::Uint32,
        }
    }

    fn max_index(&self) -> Option<u32> {
        match self {
            IndexData::U16(v) => v.iter().copied().max().map(u32::from),
            IndexData::U32(v) => v.iter().copied().max(),
        }
    }
}

fn default_fixed() -> bool {
    true
}

/// Raw geometry supplied by the caller on creation.
///
/// `primitive` stays a string so unsupported names surface as
/// [`GeomError::InvalidPrimitiveKind`] instead of a deserialization failure.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeometryData {
    /// Primitive kind name (`"TRIANGLES"`, `"triangle_strip"`, ...).
    pub primitive: String,
    /// Flat xyz positions.
    #[serde(default)]
    pub positions: Option<Vec<f32>>,
    /// Flat xyz normals, one per position.
    #[serde(default)]
    pub normals: Option<Vec<f32>>,
    /// Optional flat uv coordinates, one per position.
    #[serde(default)]
    pub texcoords: Option<Vec<f32>>,
    /// Index list.
    #[serde(default)]
    pub indices: Option<IndexData>,
    /// `false` marks the geometry as single-use: it is destroyed right after its first draw.
    #[serde(default = "default_fixed")]
    pub fixed: bool,
}

impl GeometryData {
    /// Empty data for `primitive`; attach arrays with the `with_*` builders.
    pub fn new(primitive: impl Into<String>) -> Self {
        Self {
            primitive: primitive.into(),
            positions: None,
            normals: None,
            texcoords: None,
            indices: None,
            fixed: true,
        }
    }

    /// Set positions.
    pub fn with_positions(mut self, positions: Vec<f32>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Set normals.
    pub fn with_normals(mut self, normals: Vec<f32>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Set texcoords.
    pub fn with_texcoords(mut self, texcoords: Vec<f32>) -> Self {
        self.texcoords = Some(texcoords);
        self
    }

    /// Set indices.
    pub fn with_indices(mut self, indices: IndexData) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Set the fixed flag.
    pub fn with_fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Check presence and shape of every array without touching any device state.
    pub(crate) fn validate(&self) -> GeomResult<ValidGeometry<'_>> {
        let primitive: PrimitiveKind = self.primitive.parse()?;

        let positions = self
            .positions
            .as_deref()
            .ok_or(GeomError::MissingRequiredData("positions"))?;
        let normals = self
            .normals
            .as_deref()
            .ok_or(GeomError::MissingRequiredData("normals"))?;
        let indices = self
            .indices
            .as_ref()
            .ok_or(GeomError::MissingRequiredData("indices"))?;

        let item = POSITION_ITEM_SIZE as usize;
        if positions.is_empty() || positions.len() % item != 0 {
            return Err(GeomError::invalid_data(format!(
                "positions length {} is not a non-zero multiple of {item}",
                positions.len()
            )));
        }
        let vertex_count = positions.len() / item;

        if normals.len() != positions.len() {
            return Err(GeomError::invalid_data(format!(
                "normals length {} does not match positions length {}",
                normals.len(),
                positions.len()
            )));
        }

        let texcoords = self.texcoords.as_deref();
        if let Some(tc) = texcoords
            && tc.len() != vertex_count * TEXCOORD_ITEM_SIZE as usize
        {
            return Err(GeomError::invalid_data(format!(
                "texcoords length {} does not cover {vertex_count} vertices",
                tc.len()
            )));
        }

        if indices.is_empty() {
            return Err(GeomError::invalid_data("index list is empty"));
        }
        if let Some(max) = indices.max_index()
            && max as usize >= vertex_count
        {
            return Err(GeomError::invalid_data(format!(
                "index {max} out of range for {vertex_count} vertices"
            )));
        }

        Ok(ValidGeometry {
            primitive,
            positions,
            normals,
            texcoords,
            indices,
        })
    }
}

/// Borrowed view of [`GeometryData`] that passed validation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ValidGeometry<'a> {
    pub(crate) primitive: PrimitiveKind,
    pub(crate) positions: &'a [f32],
    pub(crate) normals: &'a [f32],
    pub(crate) texcoords: Option<&'a [f32]>,
    pub(crate) indices: &'a IndexData,
}

/// Device buffers of one record, allocated in this field order.
#[derive(Debug)]
pub(crate) struct RecordBuffers {
    pub(crate) vertices: GpuBuffer,
    pub(crate) normals: GpuBuffer,
    pub(crate) texcoords: Option<GpuBuffer>,
    pub(crate) indices: GpuBuffer,
}

impl RecordBuffers {
    pub(crate) fn into_buffers(self) -> impl Iterator<Item = GpuBuffer> {
        [Some(self.vertices), Some(self.normals), self.texcoords, Some(self.indices)]
            .into_iter()
            .flatten()
    }
}

/// Outcome of releasing one record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Released {
    pub(crate) bytes: u64,
    pub(crate) buffers: u64,
    /// Buffers dropped without a device call because their surface was gone.
    pub(crate) skipped: u64,
}

/// One cached piece of geometry and its metadata.
#[derive(Debug)]
pub struct GeometryRecord {
    id: GeometryId,
    primitive: PrimitiveKind,
    buffers: RecordBuffers,
    index_count: u32,
    last_used: LogicalTime,
    fixed: bool,
}

impl GeometryRecord {
    pub(crate) fn new(
        id: GeometryId,
        primitive: PrimitiveKind,
        buffers: RecordBuffers,
        now: LogicalTime,
        fixed: bool,
    ) -> Self {
        let index_count = buffers.indices.count();
        Self {
            id,
            primitive,
            buffers,
            index_count,
            last_used: now,
            fixed,
        }
    }

    /// Cache key.
    pub fn id(&self) -> &GeometryId {
        &self.id
    }

    /// Owning surface.
    pub fn surface(&self) -> SurfaceId {
        self.id.surface()
    }

    /// Primitive topology.
    pub fn primitive(&self) -> PrimitiveKind {
        self.primitive
    }

    /// Number of indices drawn.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Logical time of the last draw (or of creation).
    pub fn last_used(&self) -> LogicalTime {
        self.last_used
    }

    /// `false` for single-use geometry.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Vertex position buffer.
    pub fn vertices(&self) -> &GpuBuffer {
        &self.buffers.vertices
    }

    /// Normal buffer.
    pub fn normals(&self) -> &GpuBuffer {
        &self.buffers.normals
    }

    /// Texcoord buffer, if uploaded.
    pub fn texcoords(&self) -> Option<&GpuBuffer> {
        self.buffers.texcoords.as_ref()
    }

    /// Index buffer.
    pub fn indices(&self) -> &GpuBuffer {
        &self.buffers.indices
    }

    /// Bytes resident across all buffers.
    pub fn byte_len(&self) -> u64 {
        self.vertices().byte_len()
            + self.normals().byte_len()
            + self.texcoords().map_or(0, GpuBuffer::byte_len)
            + self.indices().byte_len()
    }

    pub(crate) fn touch(&mut self, now: LogicalTime) {
        self.last_used = now;
    }

    pub(crate) fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    /// Free every buffer. When `surface_live` is false the device calls are skipped.
    pub(crate) fn release(self, device: &mut dyn GpuDevice, surface_live: bool) -> Released {
        let mut out = Released::default();
        for buffer in self.buffers.into_buffers() {
            out.buffers += 1;
            if surface_live {
                out.bytes += buffer.release(device);
            } else {
                out.skipped += 1;
                out.bytes += buffer.abandon();
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/record.rs"]
mod tests;
