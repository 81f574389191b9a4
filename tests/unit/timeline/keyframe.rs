use super::*;
use crate::animation::ease::Curve;

fn list(keys: Vec<Keyframe>) -> KeyframeList {
    let mut l = KeyframeList::new();
    for k in keys {
        l.insert(k).unwrap();
    }
    l
}

#[test]
fn empty_list_has_no_value() {
    assert_eq!(KeyframeList::new().value_at(1.0), None);
}

#[test]
fn single_keyframe_is_constant_everywhere() {
    let l = list(vec![Keyframe::new(1.5, 7.0)]);
    for t in [-3.0, 0.0, 1.5, 2.0, 100.0] {
        assert_eq!(l.value_at(t), Some(Value::Scalar(7.0)));
    }
}

#[test]
fn boundaries_are_exact_and_clamped() {
    let l = list(vec![
        Keyframe::new(0.5, 0.1).with_easing(Curve::OutElastic.into()),
        Keyframe::new(2.5, 0.3),
    ]);
    assert_eq!(l.value_at(0.5), Some(Value::Scalar(0.1)));
    assert_eq!(l.value_at(2.5), Some(Value::Scalar(0.3)));
    assert_eq!(l.value_at(0.0), Some(Value::Scalar(0.1)));
    assert_eq!(l.value_at(9.0), Some(Value::Scalar(0.3)));
}

#[test]
fn linear_midpoint_is_mean() {
    let l = list(vec![Keyframe::new(0.0, 2.0), Keyframe::new(4.0, 10.0)]);
    assert_eq!(l.value_at(2.0), Some(Value::Scalar(6.0)));
}

#[test]
fn position_track_example() {
    let l = list(vec![
        Keyframe::new(0.0, [0.0, 0.0, 0.0]),
        Keyframe::new(2.0, [1.0, 1.0, 0.0]),
    ]);
    assert_eq!(l.value_at(1.0), Some(Value::from([0.5, 0.5, 0.0])));
}

#[test]
fn outgoing_easing_shapes_the_segment() {
    let l = list(vec![
        Keyframe::new(0.0, 0.0).with_easing(Curve::Hold.into()),
        Keyframe::new(1.0, 1.0).with_easing(Curve::Linear.into()),
        Keyframe::new(2.0, 3.0),
    ]);
    assert_eq!(l.value_at(0.9), Some(Value::Scalar(0.0)));
    assert_eq!(l.value_at(1.5), Some(Value::Scalar(2.0)));
}

#[test]
fn discrete_values_hold_until_the_next_key_despite_overshoot() {
    let text = list(vec![
        Keyframe::new(0.0, "A").with_easing(Curve::OutBack.into()),
        Keyframe::new(1.0, "B"),
    ]);
    assert_eq!(text.value_at(0.5), Some(Value::from("A")));
    assert_eq!(text.value_at(0.99), Some(Value::from("A")));
    assert_eq!(text.value_at(1.0), Some(Value::from("B")));

    let flag = list(vec![
        Keyframe::new(0.0, false).with_easing(Curve::Lingering.into()),
        Keyframe::new(1.0, true),
    ]);
    assert_eq!(flag.value_at(0.9), Some(Value::Bool(false)));
    assert_eq!(flag.value_at(1.0), Some(Value::Bool(true)));
    assert_eq!(flag.value_at(3.0), Some(Value::Bool(true)));
}

#[test]
fn insertion_sorts_out_of_order_keys() {
    let l = list(vec![
        Keyframe::new(2.0, 2.0),
        Keyframe::new(0.0, 0.0),
        Keyframe::new(1.0, 1.0),
    ]);
    let times: Vec<f64> = l.keys().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0]);
}

#[test]
fn duplicate_times_are_rejected_but_upsert_overwrites() {
    let mut l = list(vec![Keyframe::new(1.0, 1.0)]);
    assert!(matches!(
        l.insert(Keyframe::new(1.0, 5.0)),
        Err(ChoreoError::Timeline(_))
    ));
    assert!(l.insert(Keyframe::new(1.0 + 1e-12, 5.0)).is_err());
    let old = l.upsert(Keyframe::new(1.0, 5.0)).unwrap();
    assert_eq!(old.unwrap().value, Value::Scalar(1.0));
    assert_eq!(l.len(), 1);
    assert_eq!(l.value_at(1.0), Some(Value::Scalar(5.0)));
}

#[test]
fn bad_times_and_shapes_are_rejected() {
    let mut l = KeyframeList::new();
    assert!(l.insert(Keyframe::new(-1.0, 1.0)).is_err());
    assert!(l.insert(Keyframe::new(f64::NAN, 1.0)).is_err());
    assert!(l.insert(Keyframe::new(0.0, f64::INFINITY)).is_err());
    l.insert(Keyframe::new(0.0, [0.0, 0.0])).unwrap();
    assert!(l.insert(Keyframe::new(1.0, [0.0, 0.0, 0.0])).is_err());
    assert!(l.insert(Keyframe::new(1.0, 3.0)).is_err());
}

#[test]
fn deserialization_enforces_ordering() {
    let ok: KeyframeList =
        serde_json::from_str(r#"[{"time": 0, "value": 1}, {"time": 1, "value": 2, "easing": "smooth"}]"#)
            .unwrap();
    assert_eq!(ok.len(), 2);
    assert!(
        serde_json::from_str::<KeyframeList>(r#"[{"time": 1, "value": 1}, {"time": 0, "value": 2}]"#)
            .is_err()
    );
    assert!(
        serde_json::from_str::<KeyframeList>(r#"[{"time": 1, "value": 1}, {"time": 1, "value": 2}]"#)
            .is_err()
    );
}

#[test]
fn remove_and_shift() {
    let mut l = list(vec![
        Keyframe::new(0.0, 0.0),
        Keyframe::new(1.0, 1.0),
        Keyframe::new(2.0, 2.0),
        Keyframe::new(3.0, 3.0),
    ]);
    assert_eq!(l.remove_between(0.0, 3.0), 2);
    assert_eq!(l.len(), 2);
    assert!(l.remove_at(3.0).is_some());
    assert!(l.remove_at(3.0).is_none());
    l.shift(1.0).unwrap();
    assert_eq!(l.time_range(), Some((1.0, 1.0)));
    assert!(l.shift(-5.0).is_err());
}
