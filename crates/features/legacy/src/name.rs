//! Validation of names that end up inside store keys or feature records.

use crate::error::{RolloutError, RolloutErrorExt};

/// Longest feature name or namespace, in bytes.
///
/// `"{namespace}:{feature}"` must fit every store backend.
pub const MAX_NAME_LEN: usize = 56;

const _: () = assert!(2 * MAX_NAME_LEN + 1 <= rollout_storage::MAX_KEY_LEN);

pub(crate) fn feature(name: &str) -> Result<&str, RolloutError> {
    if name.is_empty() {
        return Err(RolloutError::InvalidFeatureName {
            message: "EMPTY".into(),
            context: Some("Feature names cannot be empty".into()),
        });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(RolloutError::InvalidFeatureName {
            message: format!("{} bytes", name.len()).into(),
            context: Some(format!("Feature names are limited to {MAX_NAME_LEN} bytes").into()),
        });
    }
    if name.contains(':') || name.chars().any(char::is_whitespace) {
        return Err(RolloutError::InvalidFeatureName {
            message: name.to_owned().into(),
            context: Some("Feature names cannot contain ':' or whitespace".into()),
        });
    }
    Ok(name)
}

pub(crate) fn group(name: &str) -> Result<&str, RolloutError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(RolloutError::InvalidGroupName {
            message: if name.is_empty() { "EMPTY".into() } else { name.to_owned().into() },
            context: Some("Group names must be non-empty and contain no whitespace".into()),
        });
    }
    Ok(name)
}

/// Namespaces follow the feature rules so that `"{namespace}:"` is an unambiguous prefix.
pub(crate) fn namespace(name: &str) -> Result<&str, RolloutError> {
    feature(name).context("Invalid namespace")
}
