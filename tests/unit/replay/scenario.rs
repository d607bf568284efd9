use super::*;

#[test]
fn steps_use_an_op_tag() {
    let step: Step = serde_json::from_str(r#"{"op": "draw", "surface": 1, "kind": "box"}"#).unwrap();
    assert_eq!(
        step,
        Step::Draw {
            surface: SurfaceId(1),
            kind: "box".to_string()
        }
    );

    let step: Step =
        serde_json::from_str(r#"{"op": "event", "event": {"surface_activated": 2}}"#).unwrap();
    assert_eq!(
        step,
        Step::Event {
            event: LifecycleEvent::SurfaceActivated(SurfaceId(2))
        }
    );
    let step: Step = serde_json::from_str(r#"{"op": "evict"}"#).unwrap();
    assert_eq!(step, Step::Evict);
}

#[test]
fn failing_steps_are_collected_not_fatal() {
    let scenario = Scenario::from_json_str(
        r#"{
            "surfaces": [1],
            "steps": [
                {"op": "draw", "surface": 1, "kind": "box"},
                {"op": "event", "event": {"surface_activated": 1}},
                {"op": "exists", "surface": 1, "kind": "box"},
                {"op": "create", "surface": 1, "kind": "box", "data": {
                    "primitive": "hexagon",
                    "positions": [0, 0, 0], "normals": [0, 0, 1], "indices": {"u16": [0]}
                }},
                {"op": "create", "surface": 1, "kind": "box", "data": {
                    "primitive": "points",
                    "positions": [0, 0, 0], "normals": [0, 0, 1], "indices": {"u16": [0]}
                }},
                {"op": "exists", "surface": 1, "kind": "box"}
            ]
        }"#,
    )
    .unwrap();

    let report = run_scenario(&scenario).unwrap();
    assert_eq!(report.steps, 6);
    assert_eq!(
        report.errors.iter().map(|e| e.step).collect::<Vec<_>>(),
        [0, 3]
    );
    assert!(report.errors[0].error.contains("no active surface"));
    assert!(report.errors[1].error.contains("hexagon"));
    assert_eq!(
        report.lookups,
        [
            Lookup { step: 2, found: None },
            Lookup {
                step: 5,
                found: Some("1:box".to_string())
            }
        ]
    );
    assert_eq!(report.live, ["1:box"]);
    assert_eq!(report.live_buffers, 3);
}

#[test]
fn invalid_opts_abort_the_replay() {
    let scenario = Scenario {
        opts: BackendOpts {
            max_vertex_attribs: 99,
            ..BackendOpts::default()
        },
        surfaces: Vec::new(),
        steps: Vec::new(),
    };
    assert!(matches!(run_scenario(&scenario), Err(GeomError::Config(_))));
}

#[test]
fn unknown_step_is_a_parse_error() {
    let err = Scenario::from_json_str(r#"{"steps": [{"op": "explode"}]}"#).unwrap_err();
    assert!(matches!(err, GeomError::Config(_)));
}
