use crate::group::GroupRegistry;
use crate::state::FeatureState;
use crate::user::Identify;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// The rule that switched a feature on for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "group", rename_all = "lowercase")]
pub enum Activation {
    Global,
    User,
    Percentage,
    Group(String),
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::User => f.write_str("user"),
            Self::Percentage => f.write_str("percentage"),
            Self::Group(name) => write!(f, "group:{name}"),
        }
    }
}

/// Computes the verdict for `user` against an already loaded `state`.
///
/// Rules are tried in order and the first match wins:
/// 1. global switch (also without a user);
/// 2. no user means inactive;
/// 3. explicit user allow-list;
/// 4. percentage rollout, when non-zero;
/// 5. listed groups, in name order. Groups missing from `groups` are inactive.
///
/// The rules form a plain disjunction, so the order only decides which [`Activation`] is
/// reported.
pub fn evaluate<U>(
    feature: &str,
    state: &FeatureState,
    user: Option<&U>,
    groups: &GroupRegistry<U>,
) -> Option<Activation>
where
    U: Identify + ?Sized,
{
    if state.global {
        debug!(feature, rule = "global", "Feature active");
        return Some(Activation::Global);
    }

    let Some(user) = user else {
        debug!(feature, "Feature inactive without user");
        return None;
    };
    let id = user.rollout_id();

    if state.users.contains(&id) {
        debug!(feature, user = %id, rule = "user", "Feature active");
        return Some(Activation::User);
    }

    if !state.percentage.is_zero() && state.percentage.contains(id) {
        debug!(
            feature,
            user = %id,
            percentage = %state.percentage,
            rule = "percentage",
            "Feature active"
        );
        return Some(Activation::Percentage);
    }

    for name in &state.groups {
        let Some(predicate) = groups.predicate(name) else {
            warn!(feature, group = %name, "Feature references an undefined group");
            continue;
        };
        if predicate(user) {
            debug!(feature, user = %id, group = %name, rule = "group", "Feature active");
            return Some(Activation::Group(name.clone()));
        }
    }

    debug!(feature, user = %id, "Feature inactive");
    None
}
