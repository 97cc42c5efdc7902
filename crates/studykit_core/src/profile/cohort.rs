//! Cohort (data group) visibility rule.
//!
//! # Invariants
//! - Visible iff `in_cohorts ⊆ membership` and `not_in_cohorts ∩ membership = ∅`.
//! - An absent constraint side counts as the empty set.
//! - Membership is always passed in; nothing here retains it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Caller-supplied set of cohort labels.
pub type Membership = BTreeSet<String>;

/// Supplies the current cohort membership of the participant.
pub trait MembershipProvider {
    fn current_membership(&self) -> Membership;
}

impl MembershipProvider for Membership {
    fn current_membership(&self) -> Membership {
        self.clone()
    }
}

/// Cohort gating carried by every profile table item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_cohorts: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_in_cohorts: Option<BTreeSet<String>>,
}

impl CohortConstraint {
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.in_cohorts.is_none() && self.not_in_cohorts.is_none()
    }

    pub fn visible(&self, membership: &Membership) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        let required = self
            .in_cohorts
            .as_ref()
            .map_or(true, |required| required.is_subset(membership));
        let excluded = self
            .not_in_cohorts
            .as_ref()
            .map_or(false, |excluded| !excluded.is_disjoint(membership));
        required && !excluded
    }
}

/// Anything gated by a cohort constraint.
pub trait CohortGated {
    fn cohorts(&self) -> &CohortConstraint;
}

/// Evaluates `item` against `membership`.
pub fn visible(item: &impl CohortGated, membership: &Membership) -> bool {
    item.cohorts().visible(membership)
}

#[cfg(test)]
mod tests {
    use super::{CohortConstraint, Membership};

    fn set(values: &[&str]) -> Membership {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn unconstrained_is_always_visible() {
        let constraint = CohortConstraint::unconstrained();
        assert!(constraint.visible(&set(&[])));
        assert!(constraint.visible(&set(&["anything"])));
    }

    #[test]
    fn in_cohorts_requires_every_label() {
        let constraint = CohortConstraint {
            in_cohorts: Some(set(&["diabetes"])),
            not_in_cohorts: None,
        };
        assert!(!constraint.visible(&set(&[])));
        assert!(constraint.visible(&set(&["diabetes"])));
        assert!(constraint.visible(&set(&["diabetes", "control"])));

        let both = CohortConstraint {
            in_cohorts: Some(set(&["diabetes", "control"])),
            not_in_cohorts: None,
        };
        assert!(!both.visible(&set(&["diabetes"])));
    }

    #[test]
    fn not_in_cohorts_hides_on_any_overlap() {
        let constraint = CohortConstraint {
            in_cohorts: None,
            not_in_cohorts: Some(set(&["pregnant"])),
        };
        assert!(!constraint.visible(&set(&["pregnant"])));
        assert!(constraint.visible(&set(&[])));
        assert!(constraint.visible(&set(&["control"])));
    }

    #[test]
    fn both_sides_are_combined() {
        let constraint = CohortConstraint {
            in_cohorts: Some(set(&["diabetes"])),
            not_in_cohorts: Some(set(&["pregnant"])),
        };
        assert!(constraint.visible(&set(&["diabetes"])));
        assert!(!constraint.visible(&set(&["diabetes", "pregnant"])));
        assert!(!constraint.visible(&set(&["pregnant"])));
    }

    #[test]
    fn adding_labels_never_unhides_an_excluded_item() {
        let constraint = CohortConstraint {
            in_cohorts: Some(set(&["a"])),
            not_in_cohorts: Some(set(&["x"])),
        };
        let base = set(&["a", "x"]);
        assert!(!constraint.visible(&base));
        for extra in ["a", "b", "c", "x", "y"] {
            let mut grown = base.clone();
            grown.insert(extra.to_string());
            assert!(!constraint.visible(&grown), "extra={extra}");
        }
    }

    #[test]
    fn adding_labels_never_hides_a_required_only_item() {
        let constraint = CohortConstraint {
            in_cohorts: Some(set(&["a", "b"])),
            not_in_cohorts: None,
        };
        let base = set(&["a", "b"]);
        assert!(constraint.visible(&base));
        let mut grown = base.clone();
        for extra in ["a", "c", "x", "y", "zz"] {
            grown.insert(extra.to_string());
            assert!(constraint.visible(&grown), "extra={extra}");
        }
    }

    #[test]
    fn empty_sets_behave_like_absent_sides() {
        let constraint = CohortConstraint {
            in_cohorts: Some(set(&[])),
            not_in_cohorts: Some(set(&[])),
        };
        assert!(constraint.visible(&set(&[])));
        assert!(constraint.visible(&set(&["a"])));
    }
}
