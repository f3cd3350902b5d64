//! Behavioural suite of the legacy engine against an in-memory store.

use rollout_legacy::{Activation, FeatureInfo, GroupRegistry, Identify, Rollout, UserId};
use rollout_storage::MemoryStore;

#[derive(Debug, Clone, Copy)]
struct User {
    id: u64,
}

impl Identify for User {
    fn rollout_id(&self) -> UserId {
        UserId::new(self.id)
    }
}

fn user(id: u64) -> User {
    User { id }
}

fn rollout() -> Rollout<MemoryStore, User> {
    Rollout::new(MemoryStore::new(), GroupRegistry::new())
}

fn active(rollout: &Rollout<MemoryStore, User>, feature: &str, id: u64) -> bool {
    rollout.active(feature, Some(&user(id))).unwrap()
}

fn active_count(rollout: &Rollout<MemoryStore, User>, ids: std::ops::RangeInclusive<u64>) -> usize {
    ids.filter(|&id| active(rollout, "chat", id)).count()
}

mod group_activation {
    use super::*;

    fn setup() -> Rollout<MemoryStore, User> {
        let rollout = rollout();
        rollout.define_group("fivesonly", |u: &User| u.id == 5).unwrap();
        rollout.activate_group("chat", "fivesonly").unwrap();
        rollout
    }

    #[test]
    fn active_when_predicate_holds() {
        assert!(active(&setup(), "chat", 5));
    }

    #[test]
    fn inactive_when_predicate_fails() {
        assert!(!active(&setup(), "chat", 1));
    }

    #[test]
    fn undefined_group_in_store_stays_inactive() {
        let rollout = setup();
        rollout.activate_group("chat", "fake").unwrap();
        assert!(!active(&rollout, "chat", 1));
    }

    #[test]
    fn undefined_group_never_activates() {
        let rollout = rollout();
        rollout.activate_group("chat", "fake").unwrap();
        assert_eq!(active_count(&rollout, 0..=199), 0);
    }
}

#[test]
fn all_group_is_active_for_everyone() {
    let rollout = rollout();
    rollout.activate_group("chat", "all").unwrap();

    assert!(active(&rollout, "chat", 0));
    assert_eq!(
        rollout.explain("chat", Some(&user(77))).unwrap(),
        Some(Activation::Group("all".to_owned()))
    );
}

mod group_deactivation {
    use super::*;

    fn setup() -> Rollout<MemoryStore, User> {
        let rollout = rollout();
        rollout.define_group("fivesonly", |u: &User| u.id == 5).unwrap();
        rollout.activate_group("chat", "all").unwrap();
        rollout.activate_group("chat", "fivesonly").unwrap();
        rollout.deactivate_group("chat", "all").unwrap();
        rollout
    }

    #[test]
    fn removes_rules_of_that_group() {
        assert!(!active(&setup(), "chat", 10));
    }

    #[test]
    fn leaves_other_groups_active() {
        assert!(active(&setup(), "chat", 5));
    }

    #[test]
    fn removing_absent_group_is_a_no_op() {
        let rollout = setup();
        rollout.deactivate_group("chat", "never-added").unwrap();
        assert!(active(&rollout, "chat", 5));
    }
}

mod full_deactivation {
    use super::*;

    fn setup() -> Rollout<MemoryStore, User> {
        let rollout = rollout();
        rollout.define_group("fivesonly", |u: &User| u.id == 5).unwrap();
        rollout.activate_group("chat", "all").unwrap();
        rollout.activate_group("chat", "fivesonly").unwrap();
        rollout.activate_user("chat", &user(51)).unwrap();
        rollout.activate_percentage("chat", 100).unwrap();
        rollout.activate_globally("chat").unwrap();
        rollout.deactivate_all("chat").unwrap();
        rollout
    }

    #[test]
    fn removes_groups() {
        assert!(!active(&setup(), "chat", 0));
    }

    #[test]
    fn removes_users() {
        assert!(!active(&setup(), "chat", 51));
    }

    #[test]
    fn removes_percentage() {
        assert!(!active(&setup(), "chat", 24));
    }

    #[test]
    fn removes_global() {
        assert!(!setup().active("chat", None).unwrap());
    }

    #[test]
    fn record_is_reset_not_deleted() {
        let rollout = setup();
        assert!(rollout.feature("chat").unwrap().is_default());
        assert_eq!(rollout.features().unwrap(), vec!["chat".to_owned()]);
    }
}

mod user_activation {
    use super::*;

    #[test]
    fn active_for_that_user() {
        let rollout = rollout();
        rollout.activate_user("chat", &user(42)).unwrap();
        assert!(active(&rollout, "chat", 42));
    }

    #[test]
    fn inactive_for_other_users() {
        let rollout = rollout();
        rollout.activate_user("chat", &user(42)).unwrap();
        assert!(!active(&rollout, "chat", 24));
    }

    #[test]
    fn accepts_bare_ids() {
        let rollout = rollout();
        rollout.activate_user("chat", &UserId::new(9)).unwrap();
        assert!(active(&rollout, "chat", 9));
    }

    #[test]
    fn user_rules_need_a_user() {
        let rollout = rollout();
        rollout.activate_user("chat", &user(42)).unwrap();
        assert!(!rollout.active("chat", None).unwrap());
    }
}

mod user_deactivation {
    use super::*;

    fn setup() -> Rollout<MemoryStore, User> {
        let rollout = rollout();
        rollout.activate_user("chat", &user(42)).unwrap();
        rollout.activate_user("chat", &user(24)).unwrap();
        rollout.deactivate_user("chat", &user(42)).unwrap();
        rollout
    }

    #[test]
    fn that_user_is_no_longer_active() {
        assert!(!active(&setup(), "chat", 42));
    }

    #[test]
    fn other_users_remain_active() {
        assert!(active(&setup(), "chat", 24));
    }
}

mod global {
    use super::*;

    #[test]
    fn activates_the_feature() {
        let rollout = rollout();
        rollout.activate_globally("chat").unwrap();

        assert!(rollout.active("chat", None).unwrap());
        assert!(active(&rollout, "chat", 3));
        assert_eq!(rollout.explain("chat", None).unwrap(), Some(Activation::Global));
    }

    #[test]
    fn deactivation_makes_it_inactive() {
        let rollout = rollout();
        rollout.activate_globally("chat").unwrap();
        rollout.deactivate_globally("chat").unwrap();

        assert!(!rollout.active("chat", None).unwrap());
    }

    #[test]
    fn deactivation_keeps_other_rules() {
        let rollout = rollout();
        rollout.activate_user("chat", &user(1)).unwrap();
        rollout.activate_globally("chat").unwrap();
        rollout.deactivate_globally("chat").unwrap();

        assert!(active(&rollout, "chat", 1));
        assert!(!active(&rollout, "chat", 2));
    }
}

mod percentage {
    use super::*;

    #[test]
    fn twenty_percent_of_120_users() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 20).unwrap();
        assert_eq!(active_count(&rollout, 1..=120), 39);
    }

    #[test]
    fn twenty_percent_of_200_users() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 20).unwrap();
        assert_eq!(active_count(&rollout, 1..=200), 40);
    }

    #[test]
    fn five_percent_of_100_users() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 5).unwrap();
        assert_eq!(active_count(&rollout, 1..=100), 5);
    }

    #[test]
    fn replacing_the_percentage() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 50).unwrap();
        rollout.activate_percentage("chat", 10).unwrap();
        assert_eq!(active_count(&rollout, 0..=99), 10);
    }

    #[test]
    fn deactivation_makes_it_inactive_for_all() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 100).unwrap();
        rollout.deactivate_percentage("chat").unwrap();

        assert!(!active(&rollout, "chat", 24));
        assert_eq!(active_count(&rollout, 0..=199), 0);
    }
}

#[test]
fn unknown_feature_is_inactive() {
    let rollout = rollout();
    assert!(!rollout.active("chat", None).unwrap());
    assert!(!active(&rollout, "chat", 1));
    assert_eq!(rollout.explain("chat", Some(&user(1))).unwrap(), None);
}

#[test]
fn features_are_independent() {
    let rollout = rollout();
    rollout.activate_globally("signup").unwrap();
    rollout.activate_user("chat", &user(1)).unwrap();

    assert!(!active(&rollout, "chat", 2));
    assert!(active(&rollout, "signup", 2));
}

#[test]
fn groups_defined_after_activation_apply() {
    let rollout = rollout();
    rollout.activate_group("chat", "staff").unwrap();
    assert!(!active(&rollout, "chat", 3));

    rollout.define_group("staff", |u: &User| u.id < 10).unwrap();
    assert!(active(&rollout, "chat", 3));
}

mod info {
    use super::*;

    #[test]
    fn lists_all_global_features() {
        let rollout = rollout();
        for feature in ["signup", "chat", "table"] {
            rollout.activate_globally(feature).unwrap();
        }

        let global = rollout.info_global().unwrap().global;
        assert_eq!(global, vec!["chat".to_owned(), "signup".to_owned(), "table".to_owned()]);
    }

    #[test]
    fn excludes_features_not_globally_active() {
        let rollout = rollout();
        rollout.activate_globally("signup").unwrap();
        rollout.activate_percentage("chat", 50).unwrap();
        rollout.activate_globally("table").unwrap();
        rollout.deactivate_globally("table").unwrap();

        assert_eq!(rollout.info_global().unwrap().global, vec!["signup".to_owned()]);
    }

    #[test]
    fn with_a_percentage_set() {
        let rollout = rollout();
        rollout.activate_percentage("chat", 10).unwrap();
        rollout.activate_group("chat", "caretakers").unwrap();
        rollout.activate_group("chat", "greeters").unwrap();
        rollout.activate_globally("signup").unwrap();
        rollout.activate_user("chat", &user(42)).unwrap();

        let info = rollout.info("chat").unwrap();
        assert_eq!(info.percentage, 10);
        assert!(info.groups.contains(&"caretakers".to_owned()));
        assert!(info.groups.contains(&"greeters".to_owned()));
        assert!(info.users.contains(&UserId::new(42)));
        assert!(info.global.contains(&"signup".to_owned()));
    }

    #[test]
    fn defaults_without_configuration() {
        assert_eq!(rollout().info("chat").unwrap(), FeatureInfo::default());
        assert_eq!(
            rollout().info("chat").unwrap(),
            FeatureInfo { percentage: 0, groups: vec![], users: vec![], global: vec![] }
        );
    }
}
