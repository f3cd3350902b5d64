use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[rollout_derive::rollout_error]
pub enum StorageError {
    /// The backend cannot serve requests at all (closed, poisoned, unreachable).
    #[error("Store unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Decompression failure{}: {source}", format_context(.context))]
    Decompress { source: lz4_flex::block::DecompressError, context: Option<Cow<'static, str>> },

    /// A stored blob is not valid UTF-8.
    #[error("Value encoding failure{}: {source}", format_context(.context))]
    Encoding { source: std::string::FromUtf8Error, context: Option<Cow<'static, str>> },
}
