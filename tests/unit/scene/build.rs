use super::*;

fn build(json: &str) -> BuiltScene {
    SceneBuilder::new(RenderConfig::default())
        .build(&SceneFile::from_json(json).unwrap())
        .unwrap()
}

fn value(scene: &BuiltScene, id: &str, property: &str, t: f64) -> Option<Value> {
    let layer = scene.object(id).unwrap().layer.name();
    scene
        .timeline
        .get_value_at_time(layer, id, property, t)
        .unwrap()
}

#[test]
fn move_to_interpolates_with_rate_func() {
    let s = build(
        r#"{"scene": {"duration": 3,
            "objects": [{"id": "dot", "type": "shape", "shape": "dot"}],
            "animations": [{"target": "dot", "type": "move_to", "to": [2, 2, 0],
                            "start": 1, "duration": 2, "rate_func": "linear"}]}}"#,
    );
    assert_eq!(value(&s, "dot", "position", 0.5), Some(Value::vector(&[0.0, 0.0, 0.0])));
    assert_eq!(value(&s, "dot", "position", 2.0), Some(Value::vector(&[1.0, 1.0, 0.0])));
    assert_eq!(value(&s, "dot", "position", 3.0), Some(Value::vector(&[2.0, 2.0, 0.0])));
}

#[test]
fn fade_in_starts_hidden() {
    let s = build(
        r#"{"scene": {"duration": 2,
            "objects": [{"id": "t", "type": "text", "text": "Hi", "opacity": 0.8}],
            "animations": [{"target": "t", "type": "fade_in", "start": 1, "duration": 1,
                            "rate_func": "linear"}]}}"#,
    );
    assert_eq!(value(&s, "t", "opacity", 0.0), Some(Value::Scalar(0.0)));
    assert_eq!(value(&s, "t", "opacity", 0.9), Some(Value::Scalar(0.0)));
    assert_eq!(value(&s, "t", "opacity", 2.0), Some(Value::Scalar(0.8)));
    assert_eq!(s.object("t").unwrap().text.as_ref().unwrap().text(), "Hi");
}

#[test]
fn sequential_animations_chain_from_current_value() {
    let s = build(
        r#"{"scene": {"duration": 4,
            "objects": [{"id": "sq", "type": "shape", "shape": "square", "scale": 2}],
            "animations": [
                {"target": "sq", "type": "scale", "factor": 2, "start": 2, "rate_func": "linear"},
                {"target": "sq", "type": "scale", "factor": 3, "start": 0, "rate_func": "linear"},
                {"target": "sq", "type": "shift", "by": [1, 0, 0], "start": 0},
                {"target": "sq", "type": "shift", "by": [1, 0, 0], "start": 1}
            ]}}"#,
    );
    assert_eq!(value(&s, "sq", "scale", 1.0), Some(Value::Scalar(6.0)));
    assert_eq!(value(&s, "sq", "scale", 3.0), Some(Value::Scalar(12.0)));
    assert_eq!(value(&s, "sq", "position", 4.0), Some(Value::vector(&[2.0, 0.0, 0.0])));
}

#[test]
fn objects_land_on_semantic_layers() {
    let s = build(
        r#"{"scene": {"duration": 1, "objects": [
            {"id": "hud", "type": "text", "text": "00:00", "layer": "ui"},
            {"id": "sky", "type": "shape", "shape": "rectangle", "layer": "background"},
            {"id": "a", "type": "shape", "shape": "dot"},
            {"id": "b", "type": "shape", "shape": "dot", "z_offset": -2}
        ]}}"#,
    );
    let order: Vec<_> = s.depths.draw_order().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, ["sky", "a", "b", "hud"]);
    let names: Vec<_> = s
        .timeline
        .layers_in_draw_order()
        .iter()
        .map(|l| l.name.clone())
        .collect();
    assert_eq!(names, ["background", "main", "ui"]);
}

#[test]
fn effects_become_events_and_camera_a_track() {
    let s = build(
        r#"{"scene": {"duration": 2,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "effects": [{"kind": "flash", "target": "a", "time": 1, "duration": 0.2,
                         "tags": ["fx"]}],
            "camera": {"zoom": 1, "keyframes": [{"time": 2, "zoom": 3, "rate_func": "linear"}]},
            "markers": {"climax": 1.5}
        }}"#,
    );
    let events = s.timeline.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, "effect_0");
    assert_eq!(events[0].params["target"], "a");
    assert!(events[0].has_tag("fx"));
    let zoom = s
        .timeline
        .get_value_at_time(CAMERA_LAYER, CAMERA_TRACK, ZOOM, 1.0)
        .unwrap();
    assert_eq!(zoom, Some(Value::Scalar(2.0)));
    assert_eq!(s.timeline.markers()["climax"], 1.5);
}

#[test]
fn scene_settings_override_config() {
    let s = build(
        r##"{"scene": {"duration": 1, "fps": 24, "background_color": "#112233",
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}]}}"##,
    );
    assert_eq!(s.config.fps.num, 24);
    assert_eq!(s.timeline.frame_count(), 24);
    assert_eq!(s.config.background_color, Rgba8::rgb(0x11, 0x22, 0x33));
}

#[test]
fn invalid_scene_fails_to_build() {
    let file = SceneFile::from_json(
        r#"{"scene": {"duration": 1, "objects": [],
            "animations": [{"target": "ghost", "type": "fade_in"}]}}"#,
    )
    .unwrap();
    let err = SceneBuilder::new(RenderConfig::default())
        .build(&file)
        .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn property_animation_needs_a_start_value() {
    let file = SceneFile::from_json(
        r#"{"scene": {"duration": 1,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "animations": [{"target": "a", "type": "property", "property": "stroke", "to": 3}]}}"#,
    )
    .unwrap();
    assert!(SceneBuilder::new(RenderConfig::default()).build(&file).is_err());

    let s = build(
        r#"{"scene": {"duration": 1,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"}],
            "animations": [{"target": "a", "type": "property", "property": "stroke",
                            "from": 1, "to": 3, "rate_func": "linear"}]}}"#,
    );
    assert_eq!(value(&s, "a", "stroke", 0.5), Some(Value::Scalar(2.0)));
}

fn x_at(scene: &BuiltScene, id: &str, t: f64) -> f64 {
    value(scene, id, "position", t).unwrap().as_vector().unwrap()[0]
}

#[test]
fn non_terminating_rate_functions_settle_where_they_finish() {
    let s = build(
        r#"{"scene": {"duration": 3,
            "objects": [{"id": "a", "type": "shape", "shape": "dot"},
                        {"id": "b", "type": "shape", "shape": "dot"}],
            "animations": [
                {"target": "a", "type": "move_to", "to": [2, 0, 0], "duration": 2,
                 "rate_func": "there_and_back"},
                {"target": "b", "type": "move_to", "to": [2, 0, 0], "duration": 2,
                 "rate_func": "not_quite_there"}
            ]}}"#,
    );
    assert!((x_at(&s, "a", 1.0) - 2.0).abs() < 1e-5);
    assert!(x_at(&s, "a", 1.999_999).abs() < 1e-3);
    assert!(x_at(&s, "a", 2.0).abs() < 1e-9);
    assert!(x_at(&s, "a", 2.5).abs() < 1e-9);

    assert!((x_at(&s, "b", 2.0) - 1.4).abs() < 1e-9);
    assert!((x_at(&s, "b", 3.0) - 1.4).abs() < 1e-9);
}

#[test]
fn terminating_rate_functions_land_exactly_on_target() {
    let s = build(
        r#"{"scene": {"duration": 1,
            "objects": [{"id": "a", "type": "shape", "shape": "dot", "position": [0.1, 0, 0]}],
            "animations": [{"target": "a", "type": "move_to", "to": [0.3, 0, 0],
                            "rate_func": "linear"}]}}"#,
    );
    assert_eq!(x_at(&s, "a", 1.0), 0.3);
}

#[test]
fn first_fade_in_keeps_an_earlier_opacity_animation_at_zero() {
    let s = build(
        r#"{"scene": {"duration": 3,
            "objects": [{"id": "t", "type": "text", "text": "Hi"}],
            "animations": [
                {"target": "t", "type": "property", "property": "opacity",
                 "from": 0.5, "to": 0.2, "start": 0, "duration": 1, "rate_func": "linear"},
                {"target": "t", "type": "fade_in", "start": 2, "duration": 1,
                 "rate_func": "linear"}
            ]}}"#,
    );
    assert_eq!(value(&s, "t", "opacity", 0.0), Some(Value::Scalar(0.5)));
    let mid = value(&s, "t", "opacity", 0.5).unwrap().as_scalar().unwrap();
    assert!((mid - 0.35).abs() < 1e-12);
    assert_eq!(value(&s, "t", "opacity", 1.5), Some(Value::Scalar(0.2)));
    assert_eq!(value(&s, "t", "opacity", 3.0), Some(Value::Scalar(1.0)));
}
