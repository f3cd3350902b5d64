use crate::error::{RolloutError, RolloutErrorExt};
use crate::evaluator::{self, Activation};
use crate::group::GroupRegistry;
use crate::name;
use crate::percentage::Percentage;
use crate::state::FeatureState;
use crate::user::{Identify, UserId};
use rollout_domain::config::{DEFAULT_NAMESPACE, RolloutConfig};
use rollout_storage::{KeyValueStore, Store};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// The activation engine: feature records in a [`KeyValueStore`] plus a [`GroupRegistry`].
///
/// Every write is a load, mutate, save cycle on the single key `"{namespace}:{feature}"`.
/// The store makes each `set` atomic, but two writers racing on the same feature can still
/// lose an update; hosts that need more must serialize writes themselves.
///
/// ```rust
/// use rollout_legacy::{GroupRegistry, Rollout, UserId};
/// use rollout_storage::MemoryStore;
///
/// let rollout = Rollout::new(MemoryStore::new(), GroupRegistry::<UserId>::new());
/// rollout.activate_user("chat", &UserId::new(42))?;
///
/// assert!(rollout.active("chat", Some(&UserId::new(42)))?);
/// assert!(!rollout.active("chat", None)?);
/// # Ok::<(), rollout_legacy::RolloutError>(())
/// ```
pub struct Rollout<S, U: ?Sized = UserId> {
    store: S,
    groups: GroupRegistry<U>,
    namespace: Arc<str>,
}

impl<S, U: ?Sized> Rollout<S, U>
where
    S: KeyValueStore,
{
    /// Creates an engine under the default `feature` namespace.
    pub fn new(store: S, groups: GroupRegistry<U>) -> Self {
        Self { store, groups, namespace: Arc::from(DEFAULT_NAMESPACE) }
    }

    /// Moves every key under `namespace`.
    ///
    /// # Errors
    /// Returns [`RolloutError::InvalidFeatureName`] when `namespace` is empty or contains
    /// `:` or whitespace.
    pub fn with_namespace(mut self, namespace: impl AsRef<str>) -> Result<Self, RolloutError> {
        self.namespace = Arc::from(name::namespace(namespace.as_ref())?);
        Ok(self)
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn groups(&self) -> &GroupRegistry<U> {
        &self.groups
    }

    /// Shorthand for [`GroupRegistry::define`].
    ///
    /// # Errors
    /// See [`GroupRegistry::define`].
    pub fn define_group<F>(
        &self,
        name: impl Into<String>,
        predicate: F,
    ) -> Result<(), RolloutError>
    where
        F: Fn(&U) -> bool + Send + Sync + 'static,
    {
        self.groups.define(name, predicate)
    }

    /// Store key of `feature`.
    ///
    /// # Errors
    /// Returns [`RolloutError::InvalidFeatureName`] for names that cannot form a key.
    pub fn key(&self, feature: &str) -> Result<String, RolloutError> {
        Ok(format!("{}:{}", self.namespace, name::feature(feature)?))
    }

    /// Adds `group` to the feature's groups. The group does not need to be defined yet.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`] / [`RolloutError::InvalidGroupName`].
    /// * [`RolloutError::StorageUnavailable`] or [`RolloutError::CorruptState`] from the
    ///   load or save.
    pub fn activate_group(&self, feature: &str, group: &str) -> Result<(), RolloutError> {
        let group = name::group(group)?;
        self.update(feature, |state| {
            state.groups.insert(group.to_owned());
        })
    }

    /// Removes `group` from the feature's groups; absent groups are ignored.
    ///
    /// # Errors
    /// Same as [`activate_group`](Self::activate_group).
    pub fn deactivate_group(&self, feature: &str, group: &str) -> Result<(), RolloutError> {
        let group = name::group(group)?;
        self.update(feature, |state| {
            state.groups.remove(group);
        })
    }

    /// Adds the user's id to the feature's allow-list.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] or [`RolloutError::CorruptState`].
    pub fn activate_user<I>(&self, feature: &str, user: &I) -> Result<(), RolloutError>
    where
        I: Identify + ?Sized,
    {
        let id = user.rollout_id();
        self.update(feature, |state| {
            state.users.insert(id);
        })
    }

    /// Removes the user's id from the allow-list; absent ids are ignored.
    ///
    /// # Errors
    /// Same as [`activate_user`](Self::activate_user).
    pub fn deactivate_user<I>(&self, feature: &str, user: &I) -> Result<(), RolloutError>
    where
        I: Identify + ?Sized,
    {
        let id = user.rollout_id();
        self.update(feature, |state| {
            state.users.remove(&id);
        })
    }

    /// Replaces the rollout percentage.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidPercentage`] above 100, before touching the store.
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] or [`RolloutError::CorruptState`].
    pub fn activate_percentage(&self, feature: &str, percentage: u8) -> Result<(), RolloutError> {
        let percentage = Percentage::new(percentage)?;
        self.update(feature, |state| state.percentage = percentage)
    }

    /// Resets the rollout percentage to zero.
    ///
    /// # Errors
    /// Same as [`activate_user`](Self::activate_user).
    pub fn deactivate_percentage(&self, feature: &str) -> Result<(), RolloutError> {
        self.update(feature, |state| state.percentage = Percentage::ZERO)
    }

    /// Switches the feature on for everyone, with or without a user.
    ///
    /// # Errors
    /// Same as [`activate_user`](Self::activate_user).
    pub fn activate_globally(&self, feature: &str) -> Result<(), RolloutError> {
        self.update(feature, |state| state.global = true)
    }

    /// Clears the global switch; the other rules stay as they are.
    ///
    /// # Errors
    /// Same as [`activate_user`](Self::activate_user).
    pub fn deactivate_globally(&self, feature: &str) -> Result<(), RolloutError> {
        self.update(feature, |state| state.global = false)
    }

    /// Resets every rule at once. The key keeps the default record; it is not deleted.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] when the write fails.
    pub fn deactivate_all(&self, feature: &str) -> Result<(), RolloutError> {
        let key = self.key(feature)?;
        self.save(&key, &FeatureState::default())
    }

    /// The decoded record of `feature`; unknown features yield the default state.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] or [`RolloutError::CorruptState`].
    pub fn feature(&self, feature: &str) -> Result<FeatureState, RolloutError> {
        let key = self.key(feature)?;
        self.load(&key)
    }

    /// Whether `feature` is on for `user` (or for an anonymous request when `None`).
    ///
    /// Unknown features are simply off. Store failures are errors, never `false`.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] or [`RolloutError::CorruptState`].
    pub fn active(&self, feature: &str, user: Option<&U>) -> Result<bool, RolloutError>
    where
        U: Identify,
    {
        self.explain(feature, user).map(|activation| activation.is_some())
    }

    /// Like [`active`](Self::active) but names the rule that matched.
    ///
    /// # Errors
    /// Same as [`active`](Self::active).
    pub fn explain(
        &self,
        feature: &str,
        user: Option<&U>,
    ) -> Result<Option<Activation>, RolloutError>
    where
        U: Identify,
    {
        let state = self.feature(feature)?;
        Ok(evaluator::evaluate(feature, &state, user, &self.groups))
    }

    pub(crate) fn load(&self, key: &str) -> Result<FeatureState, RolloutError> {
        let raw = self.store.get(key).context(format!("Loading '{key}'"))?;
        let Some(raw) = raw else {
            debug!(key, "No record, using default state");
            return Ok(FeatureState::default());
        };

        let state = FeatureState::deserialize(&raw).map_err(|err| {
            error!(key, error = %err, "Persisted feature state cannot be decoded");
            err
        });
        let state = state.context(format!("Key '{key}'"))?;
        debug!(key, "Feature state loaded");
        Ok(state)
    }

    fn save(&self, key: &str, state: &FeatureState) -> Result<(), RolloutError> {
        let raw = state.serialize()?;
        self.store.set(key, &raw).context(format!("Saving '{key}'"))?;
        debug!(key, value = %raw, "Feature state saved");
        Ok(())
    }

    fn update(
        &self,
        feature: &str,
        mutate: impl FnOnce(&mut FeatureState),
    ) -> Result<(), RolloutError> {
        let key = self.key(feature)?;
        let mut state = self.load(&key)?;
        mutate(&mut state);
        self.save(&key, &state)
    }
}

impl<U: ?Sized> Rollout<Store, U> {
    /// Opens the configured store and builds an engine under the configured namespace.
    ///
    /// # Errors
    /// * [`RolloutError::StorageUnavailable`] when the store cannot be opened.
    /// * [`RolloutError::InvalidFeatureName`] for an unusable namespace.
    pub fn from_config(
        config: &RolloutConfig,
        groups: GroupRegistry<U>,
    ) -> Result<Self, RolloutError> {
        let store = rollout_storage::open(&config.store).context("Opening feature store")?;
        let rollout = Self::new(store, groups).with_namespace(&config.namespace)?;

        info!(
            namespace = %rollout.namespace,
            backend = ?config.store.backend,
            groups = ?rollout.groups.names(),
            "Rollout engine ready"
        );
        Ok(rollout)
    }
}

impl<S: Clone, U: ?Sized> Clone for Rollout<S, U> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            groups: self.groups.clone(),
            namespace: Arc::clone(&self.namespace),
        }
    }
}

impl<S: fmt::Debug, U: ?Sized> fmt::Debug for Rollout<S, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rollout")
            .field("namespace", &self.namespace)
            .field("store", &self.store)
            .field("groups", &self.groups)
            .finish()
    }
}
