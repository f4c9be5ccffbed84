use std::collections::BTreeMap;

use rstest::rstest;

use super::{Outer, SomeType};
use crate::{CharSource, Decode, DecodeError, DecoderOptions, Parser, SyntaxError, from_str};

fn violation<T: Decode>(input: &str) -> SyntaxError {
    match from_str::<T>(input) {
        Err(DecodeError::Syntax { error, .. }) => error,
        Err(other) => panic!("expected a syntax error for {input:?}, got {other}"),
        Ok(_) => panic!("expected {input:?} to be rejected"),
    }
}

#[rstest]
#[case("[", SyntaxError::ExpectedClosingArray)]
#[case("[true", SyntaxError::ExpectedClosingArray)]
#[case("[true false]", SyntaxError::ExpectedClosingArray)]
#[case("[true,,false]", SyntaxError::ExpectedValue("bool"))]
#[case("[true,]", SyntaxError::ExpectedValue("bool"))]
#[case("[1]", SyntaxError::ExpectedClosingArray)]
#[case("[tru]", SyntaxError::LiteralMismatch { literal: "true", found: ']' })]
#[case("[fals", SyntaxError::EndOfInputInLiteral("false"))]
fn malformed_bool_arrays(#[case] input: &str, #[case] expected: SyntaxError) {
    assert_eq!(violation::<Vec<bool>>(input), expected);
}

#[rstest]
#[case(r#"{"a" 1}"#, SyntaxError::ExpectedColon)]
#[case(r#"{"a":}"#, SyntaxError::ExpectedValue("i32"))]
#[case(r#"{"a": "1"}"#, SyntaxError::ExpectedValue("i32"))]
#[case(r#"{"a":1,}"#, SyntaxError::ExpectedKey)]
#[case(r#"{"a":1"#, SyntaxError::ExpectedClosingObject)]
#[case(r#"{"a":1 "b":2}"#, SyntaxError::ExpectedClosingObject)]
#[case("{1: 2}", SyntaxError::ExpectedClosingObject)]
#[case(r#"{"a"#, SyntaxError::UnterminatedString)]
#[case(r#"{"a""#, SyntaxError::ExpectedColon)]
#[case(r#"{"a": 2147483648}"#, SyntaxError::NumberOutOfRange { text: "2147483648".into(), target: "i32" })]
#[case(r#"{"a": 1.}"#, SyntaxError::MissingFractionDigits)]
fn malformed_maps(#[case] input: &str, #[case] expected: SyntaxError) {
    assert_eq!(violation::<BTreeMap<String, i32>>(input), expected);
}

#[rstest]
#[case(r#"{"Values": true}"#, SyntaxError::ExpectedValue("alloc::vec::Vec<i32>"))]
#[case(r#"{"One": [1]}"#, SyntaxError::ExpectedValue("i32"))]
#[case(r#"{"Values": [1,]}"#, SyntaxError::ExpectedValue("i32"))]
#[case(r#"{"Unknown": }"#, SyntaxError::ExpectedValue("JSON"))]
#[case(r#"{"Unknown": [1 2]}"#, SyntaxError::ExpectedClosingArray)]
#[case(r#"{"Unknown" [1]}"#, SyntaxError::ExpectedColon)]
#[case(r#"{"One": 1,}"#, SyntaxError::ExpectedKey)]
#[case(r#"{"One": 1"#, SyntaxError::ExpectedClosingObject)]
fn malformed_records(#[case] input: &str, #[case] expected: SyntaxError) {
    assert_eq!(violation::<SomeType>(input), expected);
}

#[test]
fn nested_record_errors_name_the_field_type() {
    assert_eq!(
        violation::<Outer>(r#"{"inner": "not a record"}"#),
        SyntaxError::ExpectedValue(core::any::type_name::<SomeType>())
    );
    assert_eq!(
        violation::<Outer>(r#"{"tags": {"fast": 1}}"#),
        SyntaxError::ExpectedValue("bool")
    );
}

#[test]
fn fixed_array_length_must_match() {
    assert_eq!(
        violation::<[i32; 3]>("[1, 2]"),
        SyntaxError::ArrayLength { expected: 3, found: 2 }
    );
    assert_eq!(
        violation::<[i32; 1]>("[1, 2]"),
        SyntaxError::ArrayLength { expected: 1, found: 2 }
    );
}

#[test]
fn malformed_numbers_and_strings_inside_arrays() {
    assert_eq!(violation::<Vec<f64>>("[0.]"), SyntaxError::MissingFractionDigits);
    assert_eq!(violation::<Vec<f64>>("[0.5e]"), SyntaxError::MissingExponentDigits);
    assert_eq!(violation::<Vec<f64>>("[-]"), SyntaxError::MissingIntegerDigits);
    assert_eq!(violation::<Vec<i32>>("[1.5]"), SyntaxError::NumberOutOfRange {
        text: "1.5".into(),
        target: "i32"
    });
    assert_eq!(violation::<Vec<f64>>("[1, 1e400]"), SyntaxError::NumberOutOfRange {
        text: "1e400".into(),
        target: "f64"
    });
    assert_eq!(violation::<Vec<String>>(r#"["open"#), SyntaxError::UnterminatedString);
    assert_eq!(violation::<Vec<String>>(r#"["\a"]"#), SyntaxError::InvalidEscape('a'));
    assert_eq!(
        violation::<Vec<String>>(r#"["\u12"]"#),
        SyntaxError::InvalidUnicodeEscapeChar('"')
    );
}

#[test]
fn depth_limit_is_enforced_while_decoding_and_skipping() {
    let options = DecoderOptions {
        max_depth: 2,
        ..DecoderOptions::default()
    };

    let mut decoding = Parser::from_source(CharSource::from_text("[[[1]]]"), options);
    let err = decoding.decode::<Vec<Vec<Vec<i32>>>>().unwrap_err();
    assert_eq!(err.syntax(), Some(&SyntaxError::DepthLimitExceeded(2)));

    // One level for the record itself, one for the skipped array, none left.
    let mut skipping = Parser::from_source(CharSource::from_text(r#"{"x": [[]]}"#), options);
    let err = skipping.decode::<SomeType>().unwrap_err();
    assert_eq!(err.syntax(), Some(&SyntaxError::DepthLimitExceeded(2)));
}

#[test]
fn errors_carry_the_position_of_the_violation() {
    let err = from_str::<Vec<bool>>("[\n  true,\n  nope\n]").unwrap_err();
    // `nope` cannot start a bool; the cursor is still on its `n`.
    assert_eq!(err.syntax(), Some(&SyntaxError::ExpectedValue("bool")));
    assert_eq!(err.position(), Some((3, 3)));
}
