use rollout_storage::StorageError;
use std::borrow::Cow;

/// Error types of the activation engine.
#[rollout_derive::rollout_error]
pub enum RolloutError {
    /// The key-value collaborator failed. Never reported as "feature inactive".
    #[error("Feature store unavailable{}: {source}", format_context(.context))]
    StorageUnavailable { source: StorageError, context: Option<Cow<'static, str>> },

    /// A persisted record exists but cannot be decoded.
    #[error("Corrupt feature state{}: {message}", format_context(.context))]
    CorruptState { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid feature name{}: {message}", format_context(.context))]
    InvalidFeatureName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid group name{}: {message}", format_context(.context))]
    InvalidGroupName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid percentage{}: {message}", format_context(.context))]
    InvalidPercentage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid user id{}: {message}", format_context(.context))]
    InvalidUserId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Attempt to redefine a built-in group.
    #[error("Reserved group{}: {message}", format_context(.context))]
    ReservedGroup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal rollout error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
