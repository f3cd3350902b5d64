use rollout_derive::rollout_error;
use std::borrow::Cow;

#[rollout_error]
#[derive(Debug)]
pub enum DemoError {
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[cfg(any())]
    #[error("Never compiled{}: {message}", format_context(.context))]
    Hidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<u32, DemoError> {
    raw.parse::<u32>().context("parsing demo value")
}

fn main() {
    assert!(parse("7").is_ok());
}
