use crate::error::RolloutError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identity of a user as seen by the engine.
///
/// Bucketing is a plain modulo of this value, so it is unsigned: negative identifiers are
/// rejected at the boundary by [`UserId::try_from`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<u32> for UserId {
    fn from(id: u32) -> Self {
        Self(u64::from(id))
    }
}

impl TryFrom<i64> for UserId {
    type Error = RolloutError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        u64::try_from(id).map(Self).map_err(|_| RolloutError::InvalidUserId {
            message: id.to_string().into(),
            context: Some("User ids must be non-negative".into()),
        })
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Anything that can be asked for its [`UserId`].
///
/// Group predicates receive the full value, so they can look at any attribute of a domain
/// user; the rest of the engine only needs the identifier.
///
/// ```rust
/// use rollout_legacy::{Identify, UserId};
///
/// struct Account {
///     id: u64,
///     staff: bool,
/// }
///
/// impl Identify for Account {
///     fn rollout_id(&self) -> UserId {
///         UserId::new(self.id)
///     }
/// }
///
/// let account = Account { id: 7, staff: true };
/// assert_eq!(account.rollout_id().get(), 7);
/// assert!(account.staff);
/// ```
pub trait Identify {
    fn rollout_id(&self) -> UserId;
}

impl Identify for UserId {
    fn rollout_id(&self) -> UserId {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_id_rejected() {
        assert!(matches!(UserId::try_from(-1_i64), Err(RolloutError::InvalidUserId { .. })));
        assert_eq!(UserId::try_from(42_i64).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&UserId::new(24)).unwrap(), "24");
        assert_eq!(serde_json::from_str::<UserId>("51").unwrap(), UserId::new(51));
        assert!(serde_json::from_str::<UserId>("-3").is_err());
    }
}
