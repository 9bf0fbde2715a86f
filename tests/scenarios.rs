//! Concrete substitution scenarios
//!
//! Hand-checked expectations for small dialects, read back out of the full
//! generated matrix.
//!
//! Run with: cargo test --test scenarios

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use vsub_matrix::{Expected, Matrix, Pass, Syntax, TestVector, VarAction, VarPattern};

fn strict_ascii() -> Syntax {
    Syntax::builder()
        .named_form(true)
        .braced_form(true)
        .dollar_escape(Some('$'))
        .var_pattern(VarPattern::AsciiIdentifier)
        .var_invalid(VarAction::Error)
        .var_unset(VarAction::UseEmpty)
        .var_case_sensitive(true)
        .build()
        .unwrap()
}

fn vectors(syntax: &Syntax) -> Vec<TestVector> {
    Matrix::new(syntax).collect().unwrap()
}

fn find<'v>(vectors: &'v [TestVector], pass: Pass, input: &str) -> &'v TestVector {
    vectors
        .iter()
        .find(|v| v.pass == pass && v.input == input)
        .unwrap_or_else(|| panic!("no {pass} vector for {input:?}"))
}

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn braced_reference_substitutes() {
    let all = vectors(&strict_ascii());
    let v = find(&all, Pass::Forms, "${VAR_1}");
    assert_eq!(v.env, env(&[("VAR_1", "value")]));
    assert_eq!(v.expected, Expected::output("value"));
}

#[test]
fn braced_digit_name_fails() {
    let all = vectors(&strict_ascii());
    assert_eq!(find(&all, Pass::Forms, "${1VAR}").expected, Expected::Failure);
}

#[test]
fn case_mismatch_resolves_as_unset() {
    let all = vectors(&strict_ascii());
    let v = find(&all, Pass::CaseSensitivity, "$VAR_1");
    assert_eq!(v.env, env(&[("var_1", "value")]));
    // unset is use_empty here
    assert_eq!(v.expected, Expected::output(""));

    let strict_unset = Syntax::builder()
        .dollar_escape(Some('$'))
        .var_invalid(VarAction::Error)
        .var_unset(VarAction::Error)
        .build()
        .unwrap();
    let all = vectors(&strict_unset);
    assert_eq!(
        find(&all, Pass::CaseSensitivity, "$VAR_1").expected,
        Expected::Failure
    );
}

#[test]
fn escaped_reference_is_left_literal() {
    let all = vectors(&strict_ascii());
    let v = find(&all, Pass::Escapes, "$${VAR_1}");
    assert_eq!(v.env, env(&[("VAR_1", "value")]));
    assert_eq!(v.expected, Expected::output("${VAR_1}"));
}

#[test]
fn unicode_names_depend_on_identifier_policy() {
    let unicode = Syntax::builder()
        .dollar_escape(Some('$'))
        .var_pattern(VarPattern::UnicodeIdentifier)
        .var_invalid(VarAction::Error)
        .build()
        .unwrap();
    let all = vectors(&unicode);
    let v = find(&all, Pass::Forms, "${木}");
    assert_eq!(v.env, env(&[("木", "value")]));
    assert_eq!(v.expected, Expected::output("value"));

    let all = vectors(&strict_ascii());
    assert_eq!(find(&all, Pass::Forms, "${木}").expected, Expected::Failure);
}

#[test]
fn case_insensitive_dialect_always_substitutes() {
    let syntax = Syntax::builder()
        .var_case_sensitive(false)
        .var_unset(VarAction::Error)
        .build()
        .unwrap();
    let all = vectors(&syntax);
    let case_pass: Vec<_> = all
        .iter()
        .filter(|v| v.pass == Pass::CaseSensitivity)
        .collect();
    assert!(!case_pass.is_empty());
    for v in case_pass {
        assert_eq!(v.expected, Expected::output("value"), "{v}");
    }
}

#[test]
fn named_only_dialect_treats_braces_as_text() {
    let syntax = Syntax::builder()
        .braced_form(false)
        .dollar_literal(VarAction::Error)
        .build()
        .unwrap();
    let all = vectors(&syntax);
    // `${VAR_1}` is a lone dollar followed by text
    assert_eq!(find(&all, Pass::Forms, "${VAR_1}").expected, Expected::Failure);
    assert_eq!(
        find(&all, Pass::Forms, "$VAR_1").expected,
        Expected::output("value")
    );
    assert!(all
        .iter()
        .filter(|v| matches!(v.pass, Pass::VarUnset | Pass::VarEmpty))
        .all(|v| !v.input.starts_with("${")));
}
