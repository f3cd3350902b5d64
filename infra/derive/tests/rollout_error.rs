use rollout_derive::rollout_error;
use std::borrow::Cow;

#[rollout_error]
pub enum SampleError {
    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal failure{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u8, SampleError> {
    Ok(raw.parse::<u8>()?)
}

#[test]
fn ui_cases_compile() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/rollout_error_pass.rs");
    t.pass("tests/ui/rollout_error_cfg_variant.rs");
}

#[test]
fn source_converts_through_question_mark() {
    let err = parse("not a number").expect_err("must fail");
    assert!(matches!(err, SampleError::Parse { context: None, .. }));
}

#[test]
fn context_is_rendered_in_display() {
    let err = "300".parse::<u8>().context("reading percentage").expect_err("overflow");
    let rendered = err.to_string();
    assert!(rendered.starts_with("Parse failure (reading percentage): "), "{rendered}");
}

#[test]
fn context_on_own_result_fills_the_slot() {
    let result: Result<(), SampleError> =
        Err(SampleError::Rejected { message: "nope".into(), context: None });
    let err = result.context("second pass").expect_err("still an error");
    assert_eq!(err.to_string(), "Rejected (second pass): nope");
}

#[test]
fn internal_variant_accepts_plain_strings() {
    let from_static: SampleError = "static message".into();
    let from_owned: SampleError = String::from("owned message").into();

    assert_eq!(from_static.to_string(), "Internal failure: static message");
    assert_eq!(from_owned.to_string(), "Internal failure: owned message");
}
