use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{GeomError, GeomResult};

/// Stable identifier of a rendering surface (a canvas-bound device context).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical clock value pushed by the time source. Monotonically non-decreasing.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct LogicalTime(pub u64);

/// Cache key of one geometry record: the type string namespaced by its surface.
///
/// The same type string can exist independently on every surface.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId {
    surface: SurfaceId,
    kind: String,
}

impl GeometryId {
    /// Build the identifier for `(surface, kind)`.
    pub fn new(surface: SurfaceId, kind: impl Into<String>) -> Self {
        Self {
            surface,
            kind: kind.into(),
        }
    }

    /// Surface that owns the geometry.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Type string the caller used to name the geometry.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.surface, self.kind)
    }
}

/// Primitive topology used when drawing a geometry record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Independent points.
    Points,
    /// Independent line segments.
    Lines,
    /// Closed polyline.
    LineLoop,
    /// Open polyline.
    LineStrip,
    /// Independent triangles.
    Triangles,
    /// Triangle strip.
    TriangleStrip,
    /// Triangle fan.
    TriangleFan,
}

impl PrimitiveKind {
    /// All supported kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 7] = [
        PrimitiveKind::Points,
        PrimitiveKind::Lines,
        PrimitiveKind::LineLoop,
        PrimitiveKind::LineStrip,
        PrimitiveKind::Triangles,
        PrimitiveKind::TriangleStrip,
        PrimitiveKind::TriangleFan,
    ];

    /// Canonical upper-case name (`TRIANGLE_STRIP`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Points => "POINTS",
            PrimitiveKind::Lines => "LINES",
            PrimitiveKind::LineLoop => "LINE_LOOP",
            PrimitiveKind::LineStrip => "LINE_STRIP",
            PrimitiveKind::Triangles => "TRIANGLES",
            PrimitiveKind::TriangleStrip => "TRIANGLE_STRIP",
            PrimitiveKind::TriangleFan => "TRIANGLE_FAN",
        }
    }
}

impl FromStr for PrimitiveKind {
    type Err = GeomError;

    /// Case-insensitive; `_`, `-` and spaces are ignored, so `"triangleStrip"`,
    /// `"TRIANGLE_STRIP"` and `"triangle-strip"` all parse.
    fn from_str(s: &str) -> GeomResult<Self> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let kind = match folded.as_str() {
            "POINTS" => PrimitiveKind::Points,
            "LINES" => PrimitiveKind::Lines,
            "LINELOOP" => PrimitiveKind::LineLoop,
            "LINESTRIP" => PrimitiveKind::LineStrip,
            "TRIANGLES" => PrimitiveKind::Triangles,
            "TRIANGLESTRIP" => PrimitiveKind::TriangleStrip,
            "TRIANGLEFAN" => PrimitiveKind::TriangleFan,
            _ => return Err(GeomError::InvalidPrimitiveKind(s.to_string())),
        };
        Ok(kind)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type of an index buffer, derived from its declared item width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    /// 16-bit unsigned indices.
    Uint16,
    /// 32-bit unsigned indices.
    Uint32,
}

impl IndexFormat {
    /// Map an element width in bytes to a format. Only 2 and 4 are valid.
    pub fn from_element_width(bytes: u32) -> Option<Self> {
        match bytes {
            2 => Some(IndexFormat::Uint16),
            4 => Some(IndexFormat::Uint32),
            _ => None,
        }
    }

    /// Width of one index in bytes.
    pub fn element_width(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
