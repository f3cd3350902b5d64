#![allow(unreachable_pub)]

//! # Derive
//!
//! Procedural macros shared by every crate of the workspace.
//!
//! At the moment there is a single attribute, [`macro@rollout_error`], which turns a plain
//! enum into the error type of a crate: `thiserror` wiring, a `.context(..)` extension
//! trait and `From` conversions for wrapped sources.
//!
//! ```toml
//! [dependencies]
//! rollout-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Turns an enum into a crate error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * `<Name>Ext<T>` trait with `fn context(self, ..) -> Result<T, Name>`, implemented for
///   `Result<T, Name>` (fills in the `context` field) and for `Result<T, Source>` of every
///   variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or a `#[source]`/`#[from]` field).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use in `#[error(..)]` strings.
///
/// # Requirements
///
/// * Only enums with named-field variants are accepted.
/// * `context` fields must be `Option<Cow<'static, str>>`.
/// * Variants wrapping a source must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[rollout_derive::rollout_error]
/// pub enum StoreError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<Vec<u8>, StoreError> {
///     std::fs::read(path).context("Reading record")
/// }
/// ```
#[proc_macro_attribute]
pub fn rollout_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
