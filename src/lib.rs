//! geomcache is a GPU geometry-buffer cache and draw dispatcher for scene-graph renderers.
//!
//! A [`GeometryBackend`] owns every uploaded vertex, normal, texcoord and index buffer, keyed by
//! surface and type string. It:
//!
//! - uploads geometry through a memory-pressure authority that may evict least-recently-used
//!   records to make room
//! - skips re-exporting and rebinding when the same geometry is drawn repeatedly
//! - reacts to surface, shader and scene lifecycle events delivered by the host
//!
//! Device, shader stage, surface registry and memory authority are trait seams; headless
//! reference implementations ship with the crate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod backend;
pub(crate) mod cache;
pub(crate) mod events;
pub(crate) mod gpu;
pub(crate) mod memory;
pub(crate) mod render;
/// Scripted replays against headless collaborators.
pub mod replay;

pub use crate::foundation::core::{GeometryId, IndexFormat, LogicalTime, PrimitiveKind, SurfaceId};
pub use crate::foundation::error::{GeomError, GeomResult};

pub use crate::backend::geometry_backend::{Collaborators, EVICTOR_NAME, GeometryBackend};
pub use crate::backend::opts::{BackendOpts, DEFAULT_MAX_VERTEX_ATTRIBS};
pub use crate::backend::stats::BackendStats;
pub use crate::cache::record::{GeometryData, GeometryRecord, IndexData};
pub use crate::events::lifecycle::LifecycleEvent;
pub use crate::events::surface::{SurfaceRegistry, SurfaceTable};
pub use crate::gpu::buffer::GpuBuffer;
pub use crate::gpu::device::{BufferDesc, BufferHandle, BufferTarget, BufferUsage, GpuDevice};
pub use crate::gpu::headless::{DeviceCommand, HeadlessDevice};
pub use crate::memory::authority::{
    AllocationRequest, BudgetAuthority, Evictor, EvictorId, MemoryAuthority,
};
pub use crate::render::dispatch::BindMarker;
pub use crate::render::shader::{
    ExportSummary, GeometryExport, RecordingShaderStage, ShaderActivation, ShaderStage,
};
