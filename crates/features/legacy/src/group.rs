use crate::error::RolloutError;
use crate::name;
use crate::user::UserId;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of the built-in group that matches every user.
pub const ALL_GROUP: &str = "all";

pub(crate) type Predicate<U> = Arc<dyn Fn(&U) -> bool + Send + Sync>;

/// Process-local mapping from group name to a predicate over a user.
///
/// Groups are never persisted: a host re-registers them on every start before asking for
/// verdicts. The registry is cheap to clone; clones share the same definitions, so a group
/// defined after the engine was built is visible to it immediately.
///
/// ```rust
/// use rollout_legacy::{GroupRegistry, UserId};
///
/// let groups = GroupRegistry::<UserId>::new();
/// groups.define("fivesonly", |user: &UserId| user.get() == 5)?;
///
/// assert!(groups.evaluate("fivesonly", &UserId::new(5)));
/// assert!(groups.evaluate("all", &UserId::new(1)));
/// assert!(!groups.evaluate("unknown", &UserId::new(5)));
/// # Ok::<(), rollout_legacy::RolloutError>(())
/// ```
pub struct GroupRegistry<U: ?Sized = UserId> {
    groups: Arc<RwLock<FxHashMap<String, Predicate<U>>>>,
}

impl<U: ?Sized> GroupRegistry<U> {
    /// Creates a registry holding only the [`ALL_GROUP`] predicate.
    #[must_use]
    pub fn new() -> Self {
        let mut groups: FxHashMap<String, Predicate<U>> = FxHashMap::default();
        groups.insert(ALL_GROUP.to_owned(), Arc::new(|_: &U| true));
        Self { groups: Arc::new(RwLock::new(groups)) }
    }

    /// Registers `predicate` under `name`, replacing any previous definition.
    ///
    /// # Errors
    /// * [`RolloutError::ReservedGroup`] when `name` is [`ALL_GROUP`].
    /// * [`RolloutError::InvalidGroupName`] when `name` is empty or contains whitespace.
    pub fn define<F>(&self, name: impl Into<String>, predicate: F) -> Result<(), RolloutError>
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        let name = name.into();
        name::group(&name)?;
        if name == ALL_GROUP {
            return Err(RolloutError::ReservedGroup {
                message: name.into(),
                context: Some("The built-in group always matches".into()),
            });
        }

        debug!(group = %name, "Group defined");
        self.groups.write().insert(name, Arc::new(predicate));
        Ok(())
    }

    /// Removes a caller-defined group. Returns whether it existed.
    pub fn undefine(&self, name: &str) -> bool {
        if name == ALL_GROUP {
            return false;
        }
        self.groups.write().remove(name).is_some()
    }

    /// Runs the predicate registered under `name`. Unknown groups are inactive.
    #[must_use]
    pub fn evaluate(&self, name: &str, user: &U) -> bool {
        self.predicate(name).is_some_and(|predicate| predicate(user))
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.groups.read().contains_key(name)
    }

    /// Registered group names, sorted, [`ALL_GROUP`] included.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// The lock is released before the caller runs the predicate, so predicates may
    /// themselves touch the registry.
    pub(crate) fn predicate(&self, name: &str) -> Option<Predicate<U>> {
        self.groups.read().get(name).cloned()
    }
}

impl<U: ?Sized> Default for GroupRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: ?Sized> Clone for GroupRegistry<U> {
    fn clone(&self) -> Self {
        Self { groups: Arc::clone(&self.groups) }
    }
}

impl<U: ?Sized> fmt::Debug for GroupRegistry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRegistry").field("groups", &self.names()).finish()
    }
}
