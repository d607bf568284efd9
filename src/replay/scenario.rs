use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::backend::geometry_backend::{Collaborators, GeometryBackend};
use crate::backend::opts::BackendOpts;
use crate::backend::stats::BackendStats;
use crate::cache::record::GeometryData;
use crate::events::lifecycle::LifecycleEvent;
use crate::events::surface::SurfaceTable;
use crate::foundation::core::{GeometryId, LogicalTime, SurfaceId};
use crate::foundation::error::{GeomError, GeomResult};
use crate::gpu::headless::HeadlessDevice;
use crate::memory::authority::BudgetAuthority;
use crate::render::shader::RecordingShaderStage;

/// A scripted session against headless collaborators.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Backend options; `memory_budget_bytes` sizes the budget authority.
    #[serde(default)]
    pub opts: BackendOpts,
    /// Surfaces live before the first step.
    #[serde(default)]
    pub surfaces: Vec<SurfaceId>,
    /// Steps run in order.
    pub steps: Vec<Step>,
}

/// One scripted operation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Deliver a lifecycle event.
    Event {
        /// Event to deliver.
        event: LifecycleEvent,
    },
    /// Look up `(surface, kind)`.
    Exists {
        /// Owning surface.
        surface: SurfaceId,
        /// Type string.
        kind: String,
    },
    /// Upload and cache geometry.
    Create {
        /// Owning surface.
        surface: SurfaceId,
        /// Type string.
        kind: String,
        /// Raw arrays.
        data: GeometryData,
    },
    /// Draw cached geometry.
    Draw {
        /// Owning surface.
        surface: SurfaceId,
        /// Type string.
        kind: String,
    },
    /// Destroy cached geometry.
    Destroy {
        /// Owning surface.
        surface: SurfaceId,
        /// Type string.
        kind: String,
    },
    /// Change the fixed flag of cached geometry.
    SetFixed {
        /// Owning surface.
        surface: SurfaceId,
        /// Type string.
        kind: String,
        /// New flag.
        fixed: bool,
    },
    /// Run one LRU eviction.
    Evict,
    /// Destroy everything.
    ResetAll,
    /// Make a surface live.
    AddSurface {
        /// Surface to add.
        surface: SurfaceId,
    },
    /// Make a surface disappear from the host environment.
    RemoveSurface {
        /// Surface to remove.
        surface: SurfaceId,
    },
    /// Let the next `successes` device buffer creations succeed and fail the one after.
    FailDeviceAfter {
        /// Creations that still succeed.
        successes: usize,
    },
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json_str(s: &str) -> GeomResult<Self> {
        serde_json::from_str(s).map_err(|e| GeomError::config(format!("parse scenario JSON: {e}")))
    }

    /// Parse a scenario from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GeomResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GeomError::config(format!("open scenario JSON '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            GeomError::config(format!("parse scenario JSON '{}': {e}", path.display()))
        })
    }
}

/// A step that returned an error. Failed steps do not stop the replay.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StepError {
    /// Zero-based step index.
    pub step: usize,
    /// Rendered error.
    pub error: String,
}

/// Outcome of an `exists` step.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Lookup {
    /// Zero-based step index.
    pub step: usize,
    /// Id found, as `surface:kind`.
    pub found: Option<String>,
}

/// Outcome of an `evict` step.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EvictionOutcome {
    /// Zero-based step index.
    pub step: usize,
    /// Whether a record was evicted.
    pub evicted: bool,
}

/// Summary of a finished replay.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ReplayReport {
    /// Steps run.
    pub steps: usize,
    /// Backend counters at the end.
    pub stats: BackendStats,
    /// Ids still cached, in key order.
    pub live: Vec<String>,
    /// Geometry bound at the end.
    pub bound: Option<String>,
    /// Logical clock at the end.
    pub clock: LogicalTime,
    /// Results of `exists` steps.
    pub lookups: Vec<Lookup>,
    /// Results of `evict` steps.
    pub evictions: Vec<EvictionOutcome>,
    /// Failed steps.
    pub errors: Vec<StepError>,
    /// Exports received by the shader stage.
    pub exports: usize,
    /// Commands recorded by the device.
    pub device_commands: usize,
    /// Buffers still alive on the device.
    pub live_buffers: usize,
}

/// Run `scenario` against a fresh backend with headless collaborators.
///
/// Only invalid options abort the replay; step failures are collected in the report.
#[tracing::instrument(skip(scenario), fields(steps = scenario.steps.len()))]
pub fn run_scenario(scenario: &Scenario) -> GeomResult<ReplayReport> {
    let device = HeadlessDevice::new();
    let shader = RecordingShaderStage::new();
    let surfaces = SurfaceTable::with_surfaces(scenario.surfaces.iter().copied());
    let authority = match scenario.opts.memory_budget_bytes {
        Some(budget) => BudgetAuthority::new(budget),
        None => BudgetAuthority::unlimited(),
    };
    let mut backend = GeometryBackend::new(
        scenario.opts.clone(),
        Collaborators {
            device: Box::new(device.clone()),
            shader: Box::new(shader.clone()),
            surfaces: Box::new(surfaces.clone()),
            authority: Box::new(authority),
        },
    )?;

    let mut lookups = Vec::new();
    let mut evictions = Vec::new();
    let mut errors = Vec::new();
    for (i, step) in scenario.steps.iter().enumerate() {
        let outcome = match step {
            Step::Event { event } => {
                backend.handle_event(*event);
                Ok(())
            }
            Step::Exists { surface, kind } => backend.exists(*surface, kind).map(|found| {
                lookups.push(Lookup {
                    step: i,
                    found: found.as_ref().map(ToString::to_string),
                });
            }),
            Step::Create {
                surface,
                kind,
                data,
            } => backend.create(*surface, kind, data).map(|_| ()),
            Step::Draw { surface, kind } => backend.draw(&GeometryId::new(*surface, kind.as_str())),
            Step::Destroy { surface, kind } => {
                backend.destroy(&GeometryId::new(*surface, kind.as_str()));
                Ok(())
            }
            Step::SetFixed {
                surface,
                kind,
                fixed,
            } => backend.set_fixed(&GeometryId::new(*surface, kind.as_str()), *fixed),
            Step::Evict => {
                evictions.push(EvictionOutcome {
                    step: i,
                    evicted: backend.evict_lru(),
                });
                Ok(())
            }
            Step::ResetAll => {
                backend.reset_all();
                Ok(())
            }
            Step::AddSurface { surface } => {
                surfaces.insert(*surface);
                Ok(())
            }
            Step::RemoveSurface { surface } => {
                surfaces.remove(*surface);
                Ok(())
            }
            Step::FailDeviceAfter { successes } => {
                device.fail_after(*successes);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            tracing::debug!(step = i, error = %e, "replay step failed");
            errors.push(StepError {
                step: i,
                error: e.to_string(),
            });
        }
    }

    let report = ReplayReport {
        steps: scenario.steps.len(),
        stats: backend.stats(),
        live: backend.ids().iter().map(ToString::to_string).collect(),
        bound: backend.bound().as_ref().map(ToString::to_string),
        clock: backend.clock(),
        lookups,
        evictions,
        errors,
        exports: shader.export_count(),
        device_commands: device.commands().len(),
        live_buffers: device.live_buffers(),
    };
    tracing::info!(
        live = report.live.len(),
        errors = report.errors.len(),
        exports = report.exports,
        "replay finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/replay/scenario.rs"]
mod tests;
