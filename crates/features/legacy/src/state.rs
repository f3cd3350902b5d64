use crate::error::RolloutError;
use crate::percentage::Percentage;
use crate::user::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Activation configuration of one feature.
///
/// Persisted as a single JSON object, e.g.
/// `{"percentage":10,"users":[24,42],"groups":["beta"],"global":true}`. Sets are ordered, so
/// equal states always serialize to identical strings. Every field is optional on input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureState {
    pub percentage: Percentage,
    pub users: BTreeSet<UserId>,
    pub groups: BTreeSet<String>,
    pub global: bool,
}

impl FeatureState {
    /// Whether nothing is configured: the state of a never-written feature.
    #[must_use]
    pub fn is_default(&self) -> bool {
        !self.global && self.percentage.is_zero() && self.users.is_empty() && self.groups.is_empty()
    }

    /// Canonical text form of this state.
    ///
    /// # Errors
    /// Returns [`RolloutError::Internal`] if JSON encoding fails.
    pub fn serialize(&self) -> Result<String, RolloutError> {
        serde_json::to_string(self).map_err(|err| RolloutError::Internal {
            message: err.to_string().into(),
            context: Some("Encoding feature state".into()),
        })
    }

    /// Inverse of [`serialize`](Self::serialize). Blank input is the default state.
    ///
    /// # Errors
    /// Returns [`RolloutError::CorruptState`] for anything else that is not a valid record,
    /// including out-of-range percentages and negative user ids.
    pub fn deserialize(raw: &str) -> Result<Self, RolloutError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let corrupt = |message: String| RolloutError::CorruptState {
            message: message.into(),
            context: None,
        };

        // serde also accepts the sequence form of a struct; records are objects only.
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|err| corrupt(err.to_string()))?;
        if !value.is_object() {
            return Err(corrupt(format!("expected a JSON object, found {value}")));
        }
        serde_json::from_value(value).map_err(|err| corrupt(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_default() {
        assert_eq!(FeatureState::deserialize("").unwrap(), FeatureState::default());
        assert_eq!(FeatureState::deserialize("  \n").unwrap(), FeatureState::default());
        assert_eq!(FeatureState::deserialize("{}").unwrap(), FeatureState::default());
        assert!(FeatureState::default().is_default());
    }

    #[test]
    fn test_canonical_encoding() {
        let state = FeatureState {
            percentage: Percentage::new(10).unwrap(),
            users: [UserId::new(42), UserId::new(24)].into(),
            groups: ["beta".to_owned()].into(),
            global: true,
        };

        assert_eq!(
            state.serialize().unwrap(),
            r#"{"percentage":10,"users":[24,42],"groups":["beta"],"global":true}"#
        );
        assert!(!state.is_default());
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let state = FeatureState::deserialize(r#"{"users":[7]}"#).unwrap();
        assert_eq!(state.users, [UserId::new(7)].into());
        assert!(state.percentage.is_zero());
        assert!(!state.global);
    }

    #[test]
    fn test_corrupt_records() {
        for raw in [
            "not json",
            r#"{"percentage":101}"#,
            r#"{"users":[-1]}"#,
            r#"{"global":"yes"}"#,
            "[]",
            "[10,[1],[],true]",
            "42",
            "null",
        ] {
            assert!(
                matches!(FeatureState::deserialize(raw), Err(RolloutError::CorruptState { .. })),
                "{raw} should be corrupt"
            );
        }
    }
}
