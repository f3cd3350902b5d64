use crate::error::{RolloutError, RolloutErrorExt};
use crate::store::Rollout;
use crate::user::UserId;
use rollout_storage::KeyValueStore;
use serde::Serialize;
use tracing::{debug, error};

/// Snapshot of one feature, as returned by [`Rollout::info`].
///
/// `global` is not a flag of this feature: it lists every globally active feature in the
/// namespace, so a dashboard can render one feature and the global switches side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub percentage: u8,
    pub groups: Vec<String>,
    pub users: Vec<UserId>,
    pub global: Vec<String>,
}

/// Namespace-wide snapshot, as returned by [`Rollout::info_global`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalInfo {
    /// Features switched on for everyone, sorted.
    pub global: Vec<String>,
}

impl<S, U: ?Sized> Rollout<S, U>
where
    S: KeyValueStore,
{
    /// Every feature with a record in this namespace, sorted.
    ///
    /// Features reset by `deactivate_all` keep their record and are therefore listed.
    ///
    /// # Errors
    /// Returns [`RolloutError::StorageUnavailable`] when the store cannot list keys.
    pub fn features(&self) -> Result<Vec<String>, RolloutError> {
        let prefix = format!("{}:", self.namespace());
        let keys = self.store().keys(&prefix).context(format!("Listing '{prefix}*'"))?;

        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_owned))
            .filter(|feature| !feature.is_empty() && !feature.contains(':'))
            .collect())
    }

    /// Globally active features of the namespace.
    ///
    /// Records that cannot be decoded are logged with `error!` and left out of the report,
    /// so one bad key does not hide the rest of the namespace.
    ///
    /// # Errors
    /// Returns [`RolloutError::StorageUnavailable`] when listing or loading fails.
    pub fn info_global(&self) -> Result<GlobalInfo, RolloutError> {
        let mut global = Vec::new();
        let mut skipped = 0_usize;
        for feature in self.features()? {
            let key = format!("{}:{feature}", self.namespace());
            match self.load(&key) {
                Ok(state) if state.global => global.push(feature),
                Ok(_) => {},
                Err(RolloutError::CorruptState { .. }) => {
                    error!(key, "Corrupt record left out of the global report");
                    skipped += 1;
                },
                Err(err) => return Err(err),
            }
        }

        debug!(
            namespace = %self.namespace(),
            count = global.len(),
            skipped,
            "Global features collected"
        );
        Ok(GlobalInfo { global })
    }

    /// Snapshot of `feature` plus the namespace's global features.
    ///
    /// With nothing configured this is
    /// `{percentage: 0, groups: [], users: [], global: []}`. The `global` list comes from
    /// [`info_global`](Self::info_global), so corrupt records of other features are skipped.
    ///
    /// # Errors
    /// * [`RolloutError::InvalidFeatureName`].
    /// * [`RolloutError::StorageUnavailable`] when the store fails.
    /// * [`RolloutError::CorruptState`] when the record of `feature` itself is corrupt.
    pub fn info(&self, feature: &str) -> Result<FeatureInfo, RolloutError> {
        let state = self.feature(feature)?;
        let GlobalInfo { global } = self.info_global()?;

        Ok(FeatureInfo {
            percentage: state.percentage.get(),
            groups: state.groups.into_iter().collect(),
            users: state.users.into_iter().collect(),
            global,
        })
    }
}
