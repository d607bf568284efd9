use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{GeomError, GeomResult};
use crate::gpu::device::BufferUsage;

/// Generic vertex attribute slots disabled before every export.
pub const DEFAULT_MAX_VERTEX_ATTRIBS: u32 = 8;

const MAX_VERTEX_ATTRIBS_LIMIT: u32 = 32;

fn default_max_vertex_attribs() -> u32 {
    DEFAULT_MAX_VERTEX_ATTRIBS
}

/// Options controlling a [`crate::GeometryBackend`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendOpts {
    /// Vertex attribute slots `0..max_vertex_attribs` are disabled when a new geometry is bound.
    #[serde(default = "default_max_vertex_attribs")]
    pub max_vertex_attribs: u32,
    /// Usage hint for every uploaded buffer.
    #[serde(default)]
    pub buffer_usage: BufferUsage,
    /// Byte ceiling for the reference [`crate::BudgetAuthority`]. `None` means unlimited.
    #[serde(default)]
    pub memory_budget_bytes: Option<u64>,
}

impl Default for BackendOpts {
    fn default() -> Self {
        Self {
            max_vertex_attribs: DEFAULT_MAX_VERTEX_ATTRIBS,
            buffer_usage: BufferUsage::Static,
            memory_budget_bytes: None,
        }
    }
}

impl BackendOpts {
    /// Parse and validate options from JSON text.
    pub fn from_json_str(s: &str) -> GeomResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| GeomError::config(format!("parse backend options JSON: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse and validate options from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> GeomResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            GeomError::config(format!("open backend options '{}': {e}", path.display()))
        })?;
        let opts: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            GeomError::config(format!("parse backend options '{}': {e}", path.display()))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check value ranges.
    pub fn validate(&self) -> GeomResult<()> {
        if !(1..=MAX_VERTEX_ATTRIBS_LIMIT).contains(&self.max_vertex_attribs) {
            return Err(GeomError::config(format!(
                "max_vertex_attribs must be in 1..={MAX_VERTEX_ATTRIBS_LIMIT}, got {}",
                self.max_vertex_attribs
            )));
        }
        if self.memory_budget_bytes == Some(0) {
            return Err(GeomError::config("memory_budget_bytes must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/opts.rs"]
mod tests;
