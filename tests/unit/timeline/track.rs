use super::*;
use crate::animation::ease::Curve;

fn position_track() -> Track {
    let mut t = Track::new("circle", TrackKind::Animation);
    t.add_keyframe("position", 0.0, [0.0, 0.0, 0.0], RateFunction::linear())
        .unwrap();
    t.add_keyframe("position", 2.0, [1.0, 1.0, 0.0], RateFunction::linear())
        .unwrap();
    t
}

#[test]
fn position_track_midpoint() {
    let t = position_track();
    assert_eq!(
        t.get_value_at_time("position", 1.0),
        Some(Value::vector(&[0.5, 0.5, 0.0]))
    );
    assert_eq!(
        t.get_value_at_time("position", 0.0),
        Some(Value::vector(&[0.0, 0.0, 0.0]))
    );
    assert_eq!(
        t.get_value_at_time("position", 2.0),
        Some(Value::vector(&[1.0, 1.0, 0.0]))
    );
}

#[test]
fn unknown_property_is_none() {
    assert_eq!(position_track().get_value_at_time("opacity", 1.0), None);
}

#[test]
fn properties_cannot_mix_shapes() {
    let mut t = position_track();
    let err = t
        .add_keyframe("position", 3.0, 1.0, RateFunction::linear())
        .unwrap_err();
    assert!(err.to_string().contains("vector[3]"));
}

#[test]
fn set_keyframe_replaces() {
    let mut t = position_track();
    let old = t
        .set_keyframe(
            "position",
            Keyframe::new(2.0, [2.0, 2.0, 0.0]).with_easing(Curve::Smooth.into()),
        )
        .unwrap();
    assert_eq!(old.map(|k| k.value), Some(Value::vector(&[1.0, 1.0, 0.0])));
    assert_eq!(t.keyframe_count(), 2);
}

#[test]
fn removing_last_keyframe_drops_property() {
    let mut t = Track::new("t", TrackKind::Effect);
    t.add_keyframe("glow", 1.0, 0.5, RateFunction::linear())
        .unwrap();
    assert!(t.remove_keyframe("glow", 1.0).is_some());
    assert_eq!(t.property_names().count(), 0);
    assert!(t.remove_keyframe("glow", 1.0).is_none());
}

#[test]
fn time_range_spans_properties() {
    let mut t = position_track();
    t.add_keyframe("opacity", 0.5, 0.0, RateFunction::linear())
        .unwrap();
    t.add_keyframe("opacity", 3.5, 1.0, RateFunction::linear())
        .unwrap();
    assert_eq!(t.time_range(), Some((0.0, 3.5)));
}

#[test]
fn sample_reads_every_property() {
    let mut t = position_track();
    t.add_keyframe("visible", 0.0, true, RateFunction::linear())
        .unwrap();
    let s = t.sample(1.0);
    assert_eq!(s.len(), 2);
    assert_eq!(s["visible"], Value::Bool(true));
}
