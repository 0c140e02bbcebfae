//! Weaving and executing tagged casts.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use tagweave_tests::prelude::*;

/// One method casting local 0 to `Any`, with a tag annotation on the cast.
fn cast_unit(marker: &str, params: TagParams) -> CompiledUnit {
    CompiledUnit::new("demo").method(
        MethodBody::new("cast_it")
            .instr(Instruction::LoadLocal(0))
            .mark(Label::new(0))
            .instr(Instruction::Cast(ValueType::Any))
            .instr(Instruction::ReturnValue)
            .annotate(TypeAnnotation::on_cast(Label::new(0), marker).with_params(params)),
    )
}

fn weave(unit: &CompiledUnit) -> CompiledUnit {
    let weaver = Weaver::new(WeaveConfig::new(demo_registry()));
    weaver.rewrite(unit).unwrap()
}

#[test]
fn cast_of_satisfying_value_succeeds_unchanged() {
    // GIVEN: a woven cast tagged @Positive (restricted to Int)
    let woven = weave(&cast_unit("Positive", TagParams::new()));
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();

    // WHEN
    let result = Machine::new(&session)
        .run(&loaded, "cast_it", &[Value::Int(5)])
        .unwrap();

    // THEN
    assert_eq!(result, Some(Value::Int(5)));
}

#[test]
fn cast_of_violating_value_raises_type_mismatch() {
    // GIVEN
    let woven = weave(&cast_unit("Positive", TagParams::new()));
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();

    // WHEN: 5.0 is not an Int
    let err = Machine::new(&session)
        .run(&loaded, "cast_it", &[Value::Float(5.0)])
        .unwrap_err();

    // THEN: the call-out rejects it even though the structural cast (Any)
    // would have let it through
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::TypeMismatch { .. })
    ));
}

#[test]
fn unwoven_cast_does_not_validate() {
    // The same unit without weaving accepts the float: the check comes from
    // the inserted call-out, not from the structural cast.
    let session = Session::new(demo_registry());
    let loaded = session.load(&cast_unit("Positive", TagParams::new())).unwrap();

    let result = Machine::new(&session)
        .run(&loaded, "cast_it", &[Value::Float(5.0)])
        .unwrap();
    assert_eq!(result, Some(Value::Float(5.0)));
}

#[test]
fn phone_number_cast_end_to_end() {
    // GIVEN: @PhoneNumber cast (restricted to Str, custom E.164 validator)
    let woven = weave(&cast_unit("PhoneNumber", TagParams::new()));
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();
    let machine = Machine::new(&session);

    // WHEN / THEN: a valid number passes through unchanged
    let ok = machine
        .run(&loaded, "cast_it", &[Value::Str("+12024567041".into())])
        .unwrap();
    assert_eq!(ok, Some(Value::Str("+12024567041".into())));

    // A malformed number is a value-level rejection, not a type mismatch
    let err = machine
        .run(&loaded, "cast_it", &[Value::Str("blah-blah".into())])
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::InvalidValue { .. })
    ));

    // A non-string fails the type restriction stage first
    let err = machine
        .run(&loaded, "cast_it", &[Value::Int(7)])
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::TypeMismatch { .. })
    ));
}

#[test]
fn cast_discards_normalized_value() {
    // The @Normalized validator returns a trimmed string, but the cast
    // template invokes validate() purely for its error effect: the
    // normalized result is discarded, and the original value flows through.
    // Documented behavior, kept in line with the original weaver.
    let woven = weave(&cast_unit("Normalized", TagParams::new()));
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();

    let result = Machine::new(&session)
        .run(&loaded, "cast_it", &[Value::Str("  padded  ".into())])
        .unwrap();
    assert_eq!(result, Some(Value::Str("  padded  ".into())));
}

#[test]
fn filtered_marker_is_left_unwoven_beside_a_woven_one() {
    // GIVEN: one method with a @Legacy cast and a @PhoneNumber cast
    let unit = CompiledUnit::new("demo").method(
        MethodBody::new("two_casts")
            .instr(Instruction::LoadLocal(0))
            .mark(Label::new(0))
            .instr(Instruction::Cast(ValueType::Any))
            .instr(Instruction::Pop)
            .instr(Instruction::LoadLocal(1))
            .mark(Label::new(1))
            .instr(Instruction::Cast(ValueType::Any))
            .instr(Instruction::ReturnValue)
            .annotate(TypeAnnotation::on_cast(Label::new(0), "Legacy"))
            .annotate(TypeAnnotation::on_cast(Label::new(1), "PhoneNumber")),
    );

    // WHEN: weaving with a filter that excludes Legacy
    let config = WeaveConfig::new(demo_registry()).with_filter(|m| m != "Legacy");
    let woven = Weaver::new(config).rewrite(&unit).unwrap();

    // THEN: exactly one call-out was inserted, and the Legacy cast region
    // is untouched
    let method = woven.find_method("two_casts").unwrap();
    let callouts = method
        .instructions()
        .filter(|i| matches!(i, Instruction::Callout(_)))
        .count();
    assert_eq!(callouts, 1);
    assert_eq!(
        &method.elements[..4],
        &unit.find_method("two_casts").unwrap().elements[..4]
    );

    // AND: executing it validates only the PhoneNumber cast
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();
    let machine = Machine::new(&session);
    let args = [Value::Float(1.0), Value::Str("+12024567041".into())];
    assert_eq!(
        machine.run(&loaded, "two_casts", &args).unwrap(),
        Some(Value::Str("+12024567041".into()))
    );
}

#[test]
fn zero_site_unit_is_byte_identical() {
    // A unit whose only annotations are plain markers or foreign target
    // kinds comes back serialized byte for byte.
    let unit = CompiledUnit::new("demo").method(
        MethodBody::new("m")
            .instr(Instruction::LoadLocal(0))
            .mark(Label::new(0))
            .instr(Instruction::Cast(ValueType::Int))
            .instr(Instruction::ReturnValue)
            .annotate(TypeAnnotation::on_cast(Label::new(0), "NotATag")),
    );

    let woven = weave(&unit);
    assert_eq!(
        serde_json::to_vec(&woven).unwrap(),
        serde_json::to_vec(&unit).unwrap()
    );
}

#[test]
fn weave_file_then_execute() {
    // GIVEN: a unit artifact on disk
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.unit.json");
    let unit = cast_unit("Positive", TagParams::new());
    std::fs::write(&path, serde_json::to_vec(&unit).unwrap()).unwrap();

    // WHEN: weaving it in place and loading the overwritten artifact
    let weaver = Weaver::new(WeaveConfig::new(demo_registry()));
    weaver.weave_file(&path).unwrap();
    let woven: CompiledUnit =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();

    // THEN: the woven artifact enforces the tag
    let session = Session::new(demo_registry());
    let loaded = session.load(&woven).unwrap();
    let err = Machine::new(&session)
        .run(&loaded, "cast_it", &[Value::Str("nope".into())])
        .unwrap_err();
    assert!(matches!(
        err.as_validation(),
        Some(ValidationError::TypeMismatch { .. })
    ));
}

#[test]
fn weaving_units_in_parallel_shares_one_weaver() {
    // One weaver instance, many units, one worker per unit.
    let weaver = Arc::new(Weaver::new(WeaveConfig::new(demo_registry())));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let weaver = weaver.clone();
            std::thread::spawn(move || {
                let unit = cast_unit("PhoneNumber", TagParams::new());
                let woven = weaver.rewrite(&unit).unwrap();
                assert!(woven
                    .find_method("cast_it")
                    .unwrap()
                    .instructions()
                    .any(|ins| matches!(ins, Instruction::Callout(_))));
                i
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
