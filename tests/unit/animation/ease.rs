use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn terminating_curves_hit_endpoints() {
    for (name, curve) in CURVES {
        if NON_TERMINATING.contains(curve) {
            continue;
        }
        assert!(close(curve.apply(0.0), 0.0), "{name}(0) = {}", curve.apply(0.0));
        assert!(close(curve.apply(1.0), 1.0), "{name}(1) = {}", curve.apply(1.0));
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Curve::Linear.apply(-1.0), 0.0);
    assert_eq!(Curve::Linear.apply(2.0), 1.0);
    assert_eq!(RateFunction::linear().apply(f64::NAN), 0.0);
}

#[test]
fn smooth_is_symmetric() {
    assert!(close(Curve::Smooth.apply(0.5), 0.5));
    let a = Curve::Smooth.apply(0.2);
    let b = Curve::Smooth.apply(0.8);
    assert!(close(a + b, 1.0));
}

#[test]
fn there_and_back_peaks_in_the_middle() {
    assert!(close(Curve::ThereAndBack.apply(0.5), 1.0));
    assert!(close(Curve::ThereAndBack.apply(1.0), 0.0));
    assert_eq!(Curve::ThereAndBackWithPause.apply(0.5), 1.0);
}

#[test]
fn running_start_pulls_back_first() {
    assert!(Curve::RunningStart.apply(0.2) < 0.0);
}

#[test]
fn back_and_elastic_overshoot() {
    assert!(Curve::OutBack.apply(0.7) > 1.0);
    assert!(Curve::InBack.apply(0.2) < 0.0);
    let peak = (1..100)
        .map(|i| Curve::OutElastic.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
}

#[test]
fn bounce_stays_in_unit_range() {
    for i in 0..=100 {
        let v = Curve::OutBounce.apply(f64::from(i) / 100.0);
        assert!((0.0..=1.0 + 1e-12).contains(&v));
    }
}

#[test]
fn names_resolve_with_aliases_and_normalization() {
    assert_eq!(Curve::from_name("Ease-Out-Bounce"), Some(Curve::OutBounce));
    assert_eq!(Curve::from_name("bounce"), Some(Curve::OutBounce));
    assert_eq!(Curve::from_name(" smooth "), Some(Curve::Smooth));
    assert_eq!(Curve::from_name("wobble"), None);
    assert!(matches!(
        RateFunction::from_name("wobble"),
        Err(ChoreoError::UnknownRateFunction(_))
    ));
    for (name, curve) in CURVES {
        assert_eq!(curve.name(), *name);
    }
}

#[test]
fn compose_linear_halves_is_linear() {
    let f = RateFunction::compose(
        vec![RateFunction::linear(), RateFunction::linear()],
        vec![0.5, 0.5],
    )
    .unwrap();
    for i in 0..=20 {
        let t = f64::from(i) / 20.0;
        assert!(close(f.apply(t), t));
    }
}

#[test]
fn compose_normalizes_weights() {
    let f = RateFunction::compose(
        vec![Curve::Linear.into(), Curve::Hold.into()],
        vec![3.0, 1.0],
    )
    .unwrap();
    assert!(close(f.apply(0.5), 0.375));
}

#[test]
fn compose_rejects_bad_weights() {
    let two = || vec![RateFunction::linear(), RateFunction::linear()];
    assert!(RateFunction::compose(two(), vec![1.0]).is_err());
    assert!(RateFunction::compose(two(), vec![-1.0, 2.0]).is_err());
    assert!(RateFunction::compose(two(), vec![0.0, 0.0]).is_err());
    assert!(RateFunction::compose(vec![], vec![]).is_err());
}

#[test]
fn chain_of_linears_is_linear() {
    let f = RateFunction::chain(
        vec![RateFunction::linear(), RateFunction::linear()],
        vec![1.0, 3.0],
    )
    .unwrap();
    for i in 0..=20 {
        let t = f64::from(i) / 20.0;
        assert!(close(f.apply(t), t));
    }
}

#[test]
fn chain_activates_segments_in_order() {
    let f = RateFunction::chain(
        vec![Curve::Hold.into(), Curve::Linear.into()],
        vec![1.0, 1.0],
    )
    .unwrap();
    // First half holds at 0, reaching 0.5 only at its end.
    assert_eq!(f.apply(0.25), 0.0);
    assert!(close(f.apply(0.5), 0.5));
    assert!(close(f.apply(0.75), 0.75));
    assert!(close(f.apply(1.0), 1.0));
}

#[test]
fn chain_skips_zero_width_segments() {
    let f = RateFunction::chain(
        vec![Curve::Hold.into(), Curve::Linear.into()],
        vec![0.0, 1.0],
    )
    .unwrap();
    assert!(close(f.apply(0.3), 0.3));
}

#[test]
fn combinators_do_not_mutate_inputs() {
    let a = RateFunction::from_name("smooth").unwrap();
    let b = RateFunction::from_name("linear").unwrap();
    let _ = RateFunction::compose(vec![a.clone(), b.clone()], vec![1.0, 1.0]).unwrap();
    assert_eq!(a, RateFunction::Curve(Curve::Smooth));
    assert_eq!(b, RateFunction::Curve(Curve::Linear));
}

#[test]
fn steps_and_squish() {
    let s = RateFunction::steps(4).unwrap();
    assert_eq!(s.apply(0.3), 0.25);
    assert_eq!(s.apply(1.0), 1.0);
    assert!(RateFunction::steps(0).is_err());

    let q = RateFunction::squish(RateFunction::linear(), 0.25, 0.75).unwrap();
    assert_eq!(q.apply(0.1), 0.0);
    assert!(close(q.apply(0.5), 0.5));
    assert_eq!(q.apply(0.9), 1.0);
    assert!(RateFunction::squish(RateFunction::linear(), 0.8, 0.2).is_err());
}

#[test]
fn spring_settles_and_snaps() {
    let s = RateFunction::spring(100.0, 10.0, 1.0).unwrap();
    assert_eq!(s.apply(0.0), 0.0);
    assert_eq!(s.apply(1.0), 1.0);
    assert!(RateFunction::spring(0.0, 1.0, 1.0).is_err());
}

#[test]
fn cubic_bezier_matches_linear_diagonal() {
    let f = RateFunction::cubic_bezier(0.25, 0.25, 0.75, 0.75).unwrap();
    assert!(close(f.apply(0.3), 0.3));
    assert!(RateFunction::cubic_bezier(1.5, 0.0, 0.5, 1.0).is_err());
}

#[test]
fn serde_accepts_names_and_tagged_objects() {
    let f: RateFunction = serde_json::from_str("\"ease_in_out_cubic\"").unwrap();
    assert_eq!(f, RateFunction::Curve(Curve::InOutCubic));

    let f: RateFunction =
        serde_json::from_str(r#"{"compose": {"functions": ["linear", "smooth"], "weights": [1, 1]}}"#)
            .unwrap();
    assert!(matches!(f, RateFunction::Compose { .. }));

    let f: RateFunction = serde_json::from_str(r#"{"cubic_bezier": [0.42, 0, 0.58, 1]}"#).unwrap();
    assert!(matches!(f, RateFunction::CubicBezier { .. }));

    assert!(serde_json::from_str::<RateFunction>("\"wobble\"").is_err());
    assert!(
        serde_json::from_str::<RateFunction>(
            r#"{"chain": {"functions": ["linear"], "durations": [1, 2]}}"#
        )
        .is_err()
    );
}

#[test]
fn serde_writes_names_for_curves() {
    let s = serde_json::to_string(&RateFunction::Curve(Curve::OutBounce)).unwrap();
    assert_eq!(s, "\"ease_out_bounce\"");
    let chained = RateFunction::chain(
        vec![RateFunction::linear(), RateFunction::steps(2).unwrap()],
        vec![1.0, 1.0],
    )
    .unwrap();
    let back: RateFunction = serde_json::from_str(&serde_json::to_string(&chained).unwrap()).unwrap();
    assert_eq!(back, chained);
}
