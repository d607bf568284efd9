use super::*;

#[test]
fn primitive_names_parse_loosely() {
    assert_eq!(
        "TRIANGLES".parse::<PrimitiveKind>().unwrap(),
        PrimitiveKind::Triangles
    );
    assert_eq!(
        "triangleStrip".parse::<PrimitiveKind>().unwrap(),
        PrimitiveKind::TriangleStrip
    );
    assert_eq!(
        "line-loop".parse::<PrimitiveKind>().unwrap(),
        PrimitiveKind::LineLoop
    );
    for kind in PrimitiveKind::ALL {
        assert_eq!(kind.as_str().parse::<PrimitiveKind>().unwrap(), kind);
    }
}

#[test]
fn unsupported_primitive_is_rejected_verbatim() {
    let err = "hexagon".parse::<PrimitiveKind>().unwrap_err();
    match err {
        GeomError::InvalidPrimitiveKind(name) => assert_eq!(name, "hexagon"),
        other => panic!("unexpected error: {other}"),
    }
    assert!("".parse::<PrimitiveKind>().is_err());
}

#[test]
fn geometry_ids_are_namespaced_by_surface() {
    let a = GeometryId::new(SurfaceId(1), "box");
    let b = GeometryId::new(SurfaceId(2), "box");
    assert_ne!(a, b);
    assert_eq!(a, GeometryId::new(SurfaceId(1), "box"));
    assert_eq!(a.to_string(), "1:box");
    assert_eq!(a.kind(), "box");
    assert_eq!(b.surface(), SurfaceId(2));
}

#[test]
fn index_format_widths() {
    assert_eq!(IndexFormat::from_element_width(2), Some(IndexFormat::Uint16));
    assert_eq!(IndexFormat::from_element_width(4), Some(IndexFormat::Uint32));
    assert_eq!(IndexFormat::from_element_width(1), None);
    assert_eq!(IndexFormat::Uint32.element_width(), 4);
}
