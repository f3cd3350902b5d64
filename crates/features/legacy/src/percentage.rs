use crate::error::RolloutError;
use crate::user::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of users covered by a percentage rollout, always within `0..=100`.
///
/// Zero means "no percentage rollout configured".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// # Errors
    /// Returns [`RolloutError::InvalidPercentage`] for values above 100.
    pub fn new(value: u8) -> Result<Self, RolloutError> {
        if value > 100 {
            return Err(RolloutError::InvalidPercentage {
                message: value.to_string().into(),
                context: Some("Percentage must be within 0..=100".into()),
            });
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whether `user` falls inside this rollout. See [`in_bucket`].
    #[must_use]
    pub fn contains(self, user: UserId) -> bool {
        in_bucket(user, self)
    }
}

impl TryFrom<u8> for Percentage {
    type Error = RolloutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Legacy bucketing rule: a user is inside the rollout when `id % 100 < percentage`.
///
/// No hashing is involved, so the verdict depends on the identifier alone and every
/// contiguous block of 100 ids contains exactly `percentage` active users.
///
/// ```rust
/// use rollout_legacy::{Percentage, UserId, in_bucket};
///
/// let twenty = Percentage::new(20)?;
/// assert!(in_bucket(UserId::new(119), twenty));
/// assert!(!in_bucket(UserId::new(120), twenty));
/// # Ok::<(), rollout_legacy::RolloutError>(())
/// ```
#[must_use]
pub fn in_bucket(user: UserId, percentage: Percentage) -> bool {
    user.get() % 100 < u64::from(percentage.get())
}
