use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ChoreoError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ChoreoError::timeline("x")
            .to_string()
            .contains("timeline error:")
    );
    assert!(ChoreoError::easing("x").to_string().contains("easing error:"));
    assert!(
        ChoreoError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        ChoreoError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn unknown_rate_function_names_the_culprit() {
    let err = ChoreoError::unknown_rate_function("wobble");
    assert_eq!(err.to_string(), "unknown rate function 'wobble'");
}

#[test]
fn serde_json_errors_convert() {
    let err: ChoreoError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
    assert!(matches!(err, ChoreoError::Serde(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ChoreoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
