//! # Legacy Rollout
//!
//! A feature-flag activation engine. For a named feature and an optional user it answers
//! "is this feature on?" from four independently configured rules:
//!
//! * **Global**: on for everyone, even anonymous requests.
//! * **Users**: an explicit allow-list of [`UserId`]s.
//! * **Percentage**: the users with `id % 100 < percentage` ([`in_bucket`]).
//! * **Groups**: named predicates over a user, kept in a process-local [`GroupRegistry`].
//!   The built-in `all` group matches everyone.
//!
//! Feature records live in any [`KeyValueStore`](rollout_storage::KeyValueStore) as one JSON
//! value per feature under `"{namespace}:{feature}"`. Records are created lazily by the first
//! activation and reset, never deleted, by [`Rollout::deactivate_all`].
//!
//! ## Architecture
//!
//! 1. **[`FeatureState`]**: the record and its canonical serialization.
//! 2. **[`Rollout`]**: load, mutate, save cycles for every activate / deactivate operation.
//! 3. **[`evaluate`]**: the verdict with precedence global, users, percentage, groups.
//! 4. **[`FeatureInfo`] / [`GlobalInfo`]**: snapshots for operators.
//!
//! ## Errors
//!
//! Unknown features and undefined groups are never errors, they are simply inactive. A
//! failing store surfaces as [`RolloutError::StorageUnavailable`] and an undecodable record
//! as [`RolloutError::CorruptState`]; neither is ever turned into "inactive".
//!
//! ```rust
//! use rollout_legacy::{GroupRegistry, Rollout, UserId};
//! use rollout_storage::MemoryStore;
//!
//! let rollout = Rollout::new(MemoryStore::new(), GroupRegistry::<UserId>::new());
//! rollout.define_group("fivesonly", |user: &UserId| user.get() == 5)?;
//! rollout.activate_group("chat", "fivesonly")?;
//!
//! assert!(rollout.active("chat", Some(&UserId::new(5)))?);
//! assert!(!rollout.active("chat", Some(&UserId::new(1)))?);
//! # Ok::<(), rollout_legacy::RolloutError>(())
//! ```

mod error;
mod evaluator;
mod group;
mod info;
mod name;
mod percentage;
mod state;
mod store;
mod user;

pub use crate::error::{RolloutError, RolloutErrorExt};
pub use crate::evaluator::{Activation, evaluate};
pub use crate::group::{ALL_GROUP, GroupRegistry};
pub use crate::info::{FeatureInfo, GlobalInfo};
pub use crate::name::MAX_NAME_LEN;
pub use crate::percentage::{Percentage, in_bucket};
pub use crate::state::FeatureState;
pub use crate::store::Rollout;
pub use crate::user::{Identify, UserId};
