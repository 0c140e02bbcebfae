//! Direct validator resolution through a session, without any weaving.

use pretty_assertions::assert_eq;
use tagweave_runtime::RuntimeError;
use tagweave_tests::prelude::*;

#[test]
fn explicit_validation_against_a_declared_tag() {
    // GIVEN: a session over the demo registry
    let session = Session::new(demo_registry());
    let validator = session.validator_for_marker("PhoneNumber").unwrap();

    // WHEN / THEN: a well-formed number comes back unchanged
    assert_eq!(
        validator.validate(&Value::Str("+12024567041".into())),
        Ok(Value::Str("+12024567041".into()))
    );

    // Malformed input is a value-level rejection with the validator's message
    let err = validator
        .validate(&Value::Str("blah-blah".into()))
        .unwrap_err();
    assert!(err.is_value_rejection());

    // is_valid reports the same outcome without raising
    assert!(validator.is_valid(&Value::Str("+12024567041".into())));
    assert!(!validator.is_valid(&Value::Str("blah-blah".into())));
}

#[test]
fn restriction_runs_before_the_custom_validator() {
    let session = Session::new(demo_registry());
    let validator = session.validator_for_marker("PhoneNumber").unwrap();

    // An Int never reaches the phone validator; the Str restriction rejects
    // it first
    assert_eq!(
        validator.validate(&Value::Int(7)),
        Err(ValidationError::TypeMismatch {
            expected: "Str".into(),
            actual: "has type Int".into(),
        })
    );
}

#[test]
fn unrestricted_tag_without_validator_accepts_everything() {
    let session = Session::new(demo_registry());
    let validator = session.validator_for_marker("Legacy").unwrap();

    for value in [
        Value::Null,
        Value::Bool(false),
        Value::Int(-1),
        Value::Float(0.0),
        Value::Str("anything".into()),
    ] {
        assert_eq!(validator.validate(&value), Ok(value));
    }
}

#[test]
fn plain_marker_is_not_a_tag() {
    let session = Session::new(demo_registry());
    assert!(matches!(
        session.validator_for_marker("NotATag"),
        Err(RuntimeError::NotATag(_))
    ));
}

#[test]
fn unknown_marker_is_reported() {
    let session = Session::new(demo_registry());
    assert!(matches!(
        session.validator_for_marker("NoSuchMarker"),
        Err(RuntimeError::UnknownMarker(_))
    ));
}

#[test]
fn composed_validator_applies_every_tag_in_order() {
    // GIVEN: a composite over Legacy (unrestricted) and PhoneNumber
    let session = Session::new(demo_registry());
    let composed = session
        .validator_for_uses(&[
            ("Legacy", TagParams::new()),
            ("PhoneNumber", TagParams::new()),
        ])
        .unwrap();

    // THEN: the composite enforces both tags
    assert!(composed.is_valid(&Value::Str("+12024567041".into())));
    assert!(!composed.is_valid(&Value::Str("blah-blah".into())));
    assert!(!composed.is_valid(&Value::Int(7)));
}

#[test]
fn composing_zero_tags_is_an_error() {
    let session = Session::new(demo_registry());
    assert!(matches!(
        session.validator_for_uses(&[]),
        Err(RuntimeError::NoTags)
    ));
}

#[test]
fn parameterized_use_resolves_its_own_instance() {
    let session = Session::new(demo_registry());
    let nanp = session
        .validator_for_uses(&[(
            "PhoneNumber",
            TagParams::new().with("nanp_only", ParamValue::Bool(true)),
        )])
        .unwrap();

    assert!(nanp.is_valid(&Value::Str("+12024567041".into())));
    let err = nanp.validate(&Value::Str("+442071234567".into())).unwrap_err();
    assert!(err.is_value_rejection());
}

#[test]
fn unloading_an_artifact_evicts_cached_validators() {
    // GIVEN: a validator resolved and memoized for the demo artifact's tag
    let session = Session::new(demo_registry());
    let first = session.validator_for_marker("PhoneNumber").unwrap();
    let again = session.validator_for_marker("PhoneNumber").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &again));

    // WHEN: the artifact is unloaded
    session.unload(DEMO_ARTIFACT);

    // THEN: the marker still resolves (the registry keeps its declaration)
    // but to a freshly constructed validator instance
    let fresh = session.validator_for_marker("PhoneNumber").unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &fresh));
}
