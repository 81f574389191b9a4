use super::*;

#[test]
fn resolves_both_families() {
    let bridge = RateFunctionBridge::new();
    assert_eq!(
        bridge.get_rate_function("there_and_back").unwrap(),
        RateFunction::Curve(Curve::ThereAndBack)
    );
    assert_eq!(
        bridge.get_rate_function("EASE_IN_OUT_ELASTIC").unwrap(),
        RateFunction::Curve(Curve::InOutElastic)
    );
    assert_eq!(Curve::Smooth.family(), Family::Engine);
    assert_eq!(Curve::OutBounce.family(), Family::Easing);
}

#[test]
fn unknown_name_is_a_lookup_error() {
    let bridge = RateFunctionBridge::new();
    let err = bridge.get_rate_function("nope").unwrap_err();
    assert!(matches!(err, ChoreoError::UnknownRateFunction(ref n) if n == "nope"));
    assert!(!bridge.contains("nope"));
}

#[test]
fn compose_linear_linear_half_weights_is_identity() {
    let bridge = RateFunctionBridge::new();
    let f = bridge.compose(&["linear", "linear"], &[0.5, 0.5]).unwrap();
    for i in 0..=10 {
        let t = f64::from(i) / 10.0;
        assert!((f.apply(t) - t).abs() < 1e-12);
    }
}

#[test]
fn compose_with_unknown_member_fails() {
    let bridge = RateFunctionBridge::new();
    assert!(bridge.compose(&["linear", "nope"], &[1.0, 1.0]).is_err());
}

#[test]
fn registered_functions_resolve_and_cannot_shadow() {
    let mut bridge = RateFunctionBridge::new();
    let f = bridge.chain(&["rush_into", "rush_from"], &[1.0, 1.0]).unwrap();
    bridge.register("Swoop", f.clone()).unwrap();
    assert_eq!(bridge.get_rate_function("swoop").unwrap(), f);
    assert!(bridge.register("swoop", RateFunction::linear()).is_err());
    assert!(bridge.register("smooth", RateFunction::linear()).is_err());
    assert!(bridge.register("bounce", RateFunction::linear()).is_err());
    assert!(bridge.register("  ", RateFunction::linear()).is_err());
}

#[test]
fn refs_resolve_names_and_inline() {
    let mut bridge = RateFunctionBridge::new();
    bridge.register("mine", RateFunction::steps(3).unwrap()).unwrap();
    let refs: Vec<RateFunctionRef> =
        serde_json::from_str(r#"["mine", {"steps": 2}, "linear"]"#).unwrap();
    assert_eq!(refs[0], RateFunctionRef::Name("mine".to_string()));
    assert_eq!(
        bridge.resolve(&refs[0]).unwrap(),
        RateFunction::Steps(3)
    );
    assert_eq!(bridge.resolve(&refs[1]).unwrap(), RateFunction::Steps(2));
    assert_eq!(bridge.resolve(&refs[2]).unwrap(), RateFunction::linear());
}

#[test]
fn catalogue_lists_every_family() {
    let mut bridge = RateFunctionBridge::new();
    bridge.register("mine", RateFunction::linear()).unwrap();
    let cat = bridge.catalogue();
    assert_eq!(cat.len(), CURVES.len() + ALIASES.len() + 1);
    assert!(cat.iter().any(|e| e.family == Family::Alias && e.name == "bounce"));
    assert_eq!(cat.last().unwrap().family, Family::Custom);
    for entry in &cat {
        assert!(bridge.contains(&entry.name), "{}", entry.name);
    }
}

#[test]
fn combinator_refs_resolve_custom_members() {
    let mut bridge = RateFunctionBridge::new();
    bridge.register("snap", RateFunction::steps(2).unwrap()).unwrap();
    let r: RateFunctionRef = serde_json::from_str(
        r#"{"chain": {"functions": ["snap", {"steps": 4}, "linear"], "durations": [1, 1, 2]}}"#,
    )
    .unwrap();
    assert!(matches!(r, RateFunctionRef::Combinator(CombinatorRef::Chain { .. })));
    let f = bridge.resolve(&r).unwrap();
    assert_eq!(
        f,
        RateFunction::chain(
            vec![
                RateFunction::Steps(2),
                RateFunction::Steps(4),
                RateFunction::linear()
            ],
            vec![1.0, 1.0, 2.0]
        )
        .unwrap()
    );

    let r: RateFunctionRef = serde_json::from_str(
        r#"{"compose": {"functions": ["snap", "nope"], "weights": [1, 1]}}"#,
    )
    .unwrap();
    assert!(matches!(
        bridge.resolve(&r),
        Err(ChoreoError::UnknownRateFunction(ref n)) if n == "nope"
    ));
}
