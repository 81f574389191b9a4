use super::*;

fn scene(json: &str) -> SceneFile {
    SceneFile::from_json(json).unwrap()
}

fn diagnose(json: &str) -> Diagnostics {
    scene(json).validate(&TextFactory::default())
}

fn paths(d: &Diagnostics, severity: Severity) -> Vec<String> {
    d.iter()
        .filter(|x| x.severity == severity)
        .map(|x| x.path.clone())
        .collect()
}

#[test]
fn clean_scene_has_no_errors() {
    let d = diagnose(
        r#"{"scene": {
            "duration": 3,
            "objects": [
                {"id": "title", "type": "text", "text": "Hello", "layer": "overlay"},
                {"id": "dot", "type": "shape", "shape": "circle", "radius": 0.5}
            ],
            "animations": [
                {"target": "title", "type": "fade_in", "duration": 1, "rate_func": "smooth"},
                {"target": "dot", "type": "move_to", "to": [1, 1, 0], "start": 1}
            ]
        }}"#,
    );
    assert!(!d.has_errors(), "{d:?}");
    assert_eq!(d.count(Severity::Warning), 0);
}

#[test]
fn duplicate_ids_and_unknown_targets() {
    let d = diagnose(
        r#"{"scene": {
            "duration": 2,
            "objects": [
                {"id": "a", "type": "shape", "shape": "square"},
                {"id": "a", "type": "shape", "shape": "dot"}
            ],
            "animations": [{"target": "ghost", "type": "fade_out"}]
        }}"#,
    );
    assert_eq!(
        paths(&d, Severity::Error),
        ["scene.objects[1].id", "scene.animations[0].target"]
    );
    assert!(d.clone().into_result().is_err());
}

#[test]
fn unknown_rate_function_is_an_error_but_custom_names_resolve() {
    let d = diagnose(
        r#"{"scene": {
            "duration": 2,
            "rate_functions": {"snappy": {"cubic_bezier": [0.2, 0.9, 0.1, 1.0]}},
            "objects": [{"id": "a", "type": "shape", "shape": "square"}],
            "animations": [
                {"target": "a", "type": "scale", "factor": 2, "rate_func": "snappy"},
                {"target": "a", "type": "rotate", "angle": 1, "start": 1, "rate_func": "wobble"}
            ]
        }}"#,
    );
    assert_eq!(paths(&d, Severity::Error), ["scene.animations[1].rate_func"]);
}

#[test]
fn redefining_builtin_rate_function_is_rejected() {
    let d = diagnose(
        r#"{"scene": {"duration": 1, "rate_functions": {"smooth": "linear"},
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}]}}"#,
    );
    assert_eq!(paths(&d, Severity::Error), ["scene.rate_functions.smooth"]);
}

#[test]
fn text_policy_runs_through_the_factory() {
    let d = diagnose(
        r#"{"scene": {"duration": 1, "objects": [
            {"id": "blank", "type": "text", "text": "  "},
            {"id": "huge", "type": "text", "text": "Hi", "font_size": 9000}
        ]}}"#,
    );
    assert_eq!(paths(&d, Severity::Error), ["scene.objects[0].text"]);
    assert_eq!(paths(&d, Severity::Warning), ["scene.objects[1].font_size"]);
}

#[test]
fn property_ranges_are_checked() {
    let d = diagnose(
        r#"{"scene": {"duration": 1, "objects": [
            {"id": "a", "type": "shape", "shape": "rectangle", "opacity": 1.5,
             "z_offset": 7, "width": -1}
        ]}}"#,
    );
    assert_eq!(
        paths(&d, Severity::Error),
        [
            "scene.objects[0].opacity",
            "scene.objects[0].z_offset",
            "scene.objects[0].width"
        ]
    );
}

#[test]
fn group_problems_are_reported() {
    let d = diagnose(
        r#"{"scene": {"duration": 1, "objects": [
            {"id": "g1", "type": "group", "children": ["g2", "missing"]},
            {"id": "g2", "type": "group", "children": ["g1"]}
        ]}}"#,
    );
    let errors = paths(&d, Severity::Error);
    assert!(errors.contains(&"scene.objects[0].children[1]".to_string()));
    assert!(d.iter().any(|x| x.message.contains("cycle")));
}

#[test]
fn late_and_overlapping_animations_warn() {
    let d = diagnose(
        r#"{"scene": {"duration": 2,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "animations": [
                {"target": "a", "type": "move_to", "to": [1, 0, 0], "duration": 1.5},
                {"target": "a", "type": "shift", "by": [0, 1, 0], "start": 1, "duration": 1.5}
            ],
            "effects": [{"kind": "flash", "time": 5}]
        }}"#,
    );
    assert!(!d.has_errors());
    assert_eq!(
        paths(&d, Severity::Warning),
        [
            "scene.animations[1]",
            "scene.animations[1]",
            "scene.effects[0].time"
        ]
    );
}

#[test]
fn missing_duration_is_derived() {
    let s = scene(
        r#"{"scene": {"objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "animations": [{"target": "a", "type": "fade_in", "start": 1, "duration": 2.5}]}}"#,
    );
    assert_eq!(s.scene.effective_duration(), 3.5);
    let d = s.validate(&TextFactory::default());
    assert_eq!(d.count(Severity::Info), 1);
}

#[test]
fn camera_keys_are_checked() {
    let d = diagnose(
        r#"{"scene": {"duration": 2,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "camera": {"zoom": 0, "keyframes": [
                {"time": 1, "zoom": 2},
                {"time": 1, "position": [1, 0, 0]},
                {"time": 1.5}
            ]}
        }}"#,
    );
    assert_eq!(
        paths(&d, Severity::Error),
        ["scene.camera.zoom", "scene.camera.keyframes[1].time"]
    );
    assert_eq!(paths(&d, Severity::Warning), ["scene.camera.keyframes[2]"]);
}

#[test]
fn diagnostic_display_is_one_line() {
    let d = Diagnostic {
        severity: Severity::Warning,
        path: "scene.objects[0]".into(),
        message: "odd".into(),
    };
    assert_eq!(d.to_string(), "warning: scene.objects[0]: odd");
}

#[test]
fn property_animations_must_match_the_existing_shape() {
    let d = diagnose(
        r##"{"scene": {"duration": 4,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "animations": [
                {"target": "a", "type": "property", "property": "position", "to": 1.5},
                {"target": "a", "type": "property", "property": "glow", "to": [1, 2], "start": 2},
                {"target": "a", "type": "property", "property": "glow", "from": [0, 0],
                 "to": [3, 4], "start": 1},
                {"target": "a", "type": "color", "to": "#ff0000", "start": 3},
                {"target": "a", "type": "property", "property": "color", "to": 0.5, "start": 3.5},
                {"target": "a", "type": "property", "property": "stroke", "to": 2, "start": 2}
            ]}}"##,
    );
    assert_eq!(
        paths(&d, Severity::Error),
        [
            "scene.animations[0].to",
            "scene.animations[5].from",
            "scene.animations[4].to"
        ]
    );
    let first = d.iter().find(|x| x.severity == Severity::Error).unwrap();
    assert!(first.message.contains("scalar"), "{}", first.message);
    assert!(first.message.contains("vector[3]"), "{}", first.message);
}

#[test]
fn combinators_may_name_scene_rate_functions() {
    let d = diagnose(
        r#"{"scene": {
            "duration": 2,
            "rate_functions": {"snap": {"steps": 3}},
            "objects": [{"id": "a", "type": "shape", "shape": "square"}],
            "animations": [
                {"target": "a", "type": "scale", "factor": 2,
                 "rate_func": {"compose": {"functions": ["snap", "smooth"], "weights": [1, 1]}}},
                {"target": "a", "type": "rotate", "angle": 1, "start": 1,
                 "rate_func": {"chain": {"functions": ["snap", "wobble"], "durations": [1, 1]}}}
            ]
        }}"#,
    );
    assert_eq!(paths(&d, Severity::Error), ["scene.animations[1].rate_func"]);
}
