use super::*;
use crate::foundation::core::SurfaceId;

#[test]
fn display_prefixes_are_stable() {
    assert_eq!(GeomError::NoActiveSurface.to_string(), "no active surface");
    assert!(
        GeomError::InvalidPrimitiveKind("hexagon".to_string())
            .to_string()
            .contains("invalid primitive kind:")
    );
    assert!(
        GeomError::MissingRequiredData("normals")
            .to_string()
            .contains("missing required geometry data: normals")
    );
    assert!(
        GeomError::invalid_data("x")
            .to_string()
            .contains("invalid geometry data:")
    );
    assert!(GeomError::config("x").to_string().contains("config error:"));
}

#[test]
fn allocation_failure_names_the_buffer() {
    let err = GeomError::allocation("1:box vertex buffer", "budget exhausted");
    let msg = err.to_string();
    assert!(msg.contains("1:box vertex buffer"));
    assert!(msg.contains("budget exhausted"));
}

#[test]
fn unknown_geometry_prints_namespaced_id() {
    let id = GeometryId::new(SurfaceId(7), "sphere");
    assert_eq!(
        GeomError::UnknownGeometry(id).to_string(),
        "unknown geometry: 7:sphere"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GeomError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
