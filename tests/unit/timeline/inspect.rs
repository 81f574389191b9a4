use super::*;
use crate::{
    animation::ease::Curve,
    config::RenderConfig,
    timeline::{Event, Layer, Track},
};

fn timeline() -> Timeline {
    let mut tl = Timeline::new(&RenderConfig::default(), 2.0).unwrap();
    let layer = tl.add_layer(Layer::new("main")).unwrap();
    let track = layer
        .add_track(Track::new("dot", TrackKind::Animation))
        .unwrap();
    track
        .add_keyframe("opacity", 0.0, 0.0, RateFunction::linear())
        .unwrap();
    track
        .add_keyframe("opacity", 3.0, 1.0, RateFunction::linear())
        .unwrap();
    layer
        .add_track(Track::new("empty", TrackKind::Audio))
        .unwrap();
    tl.add_event(Event::new("late", 5.0, "flash")).unwrap();
    tl
}

#[test]
fn report_summarises_and_warns() {
    let report = TimelineReport::new(&timeline());
    assert_eq!(report.frame_count, 60);
    assert_eq!(report.layers.len(), 1);
    let dot = &report.layers[0].tracks[0];
    assert_eq!(dot.properties[0].keyframes, 2);
    assert_eq!(dot.properties[0].shape, "scalar");
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings.iter().any(|w| w.contains("after the end")));
    assert!(report.warnings.iter().any(|w| w.contains("no keyframes")));
    assert!(report.warnings.iter().any(|w| w.contains("never fires")));
}

#[test]
fn report_display_lists_structure() {
    let text = TimelineReport::new(&timeline()).to_string();
    assert!(text.contains("layer main (z=0)"));
    assert!(text.contains("opacity: 2 keys"));
    assert!(text.contains("warning:"));
}

#[test]
fn sample_property_covers_duration() {
    let tl = timeline();
    let s = sample_property(&tl, "main", "dot", "opacity", 3).unwrap();
    assert_eq!(s.len(), 3);
    assert_eq!(s[0], (0.0, Value::Scalar(0.0)));
    assert_eq!(s[2].0, 2.0);
    assert!(sample_property(&tl, "main", "dot", "opacity", 1).is_err());
}

#[test]
fn sample_rate_function_hits_endpoints() {
    let s = sample_rate_function(&Curve::Smooth.into(), 5);
    assert_eq!(s.len(), 5);
    assert_eq!(s[0], (0.0, 0.0));
    assert!((s[4].1 - 1.0).abs() < 1e-9);
}
