use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::status::{StatusCategory, StatusConfig};

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransitionRejection {
    #[error("current status is not configured")]
    UnknownCurrent,
    #[error("current status is terminal")]
    Terminal,
    #[error("target is not listed in the allowed transitions")]
    NotAllowed,
    #[error("target status is not configured")]
    UnknownTarget,
    #[error("target status is inactive")]
    InactiveTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionCheck {
    pub from: String,
    pub to: String,
    pub from_category: StatusCategory,
    pub to_category: StatusCategory,
    /// Set when a quote status hands the entity over to an order status.
    pub promotion: bool,
}

/// Looks a status up by name. Names are only unique per category, so callers
/// may state which category to try first; the other one is the fallback.
pub fn find_status<'a>(
    statuses: &'a [StatusConfig],
    name: &str,
    prefer: Option<StatusCategory>,
) -> Option<&'a StatusConfig> {
    match prefer {
        Some(category) => statuses
            .iter()
            .find(|status| status.category == category && status.name == name)
            .or_else(|| statuses.iter().find(|status| status.name == name)),
        None => statuses.iter().find(|status| status.name == name),
    }
}

/// Transition graph over both categories, keyed by status name.
///
/// The validator owns no position of its own: callers hand in the current
/// status name of each entity.
#[derive(Clone, Copy, Debug)]
pub struct TransitionValidator<'a> {
    statuses: &'a [StatusConfig],
}

impl<'a> TransitionValidator<'a> {
    pub fn new(statuses: &'a [StatusConfig]) -> Self {
        Self { statuses }
    }

    pub fn is_transition_allowed(&self, current: &str, target: &str) -> bool {
        match find_status(self.statuses, current, None) {
            Some(status) => status.allows_transition_to(target),
            None => false,
        }
    }

    /// Allowed targets that are still configured and active, in the order the
    /// current status lists them.
    pub fn list_reachable_statuses(&self, current: &str) -> Vec<String> {
        let Some(status) = find_status(self.statuses, current, None) else {
            return Vec::new();
        };
        if status.is_terminal {
            return Vec::new();
        }

        let mut reachable: Vec<String> = Vec::new();
        for name in &status.allowed_transitions {
            if reachable.contains(name) {
                continue;
            }
            let active = find_status(self.statuses, name, Some(status.category))
                .map(|target| target.is_active)
                .unwrap_or(false);
            if active {
                reachable.push(name.clone());
            }
        }
        reachable
    }

    pub fn check_transition(
        &self,
        current: &str,
        target: &str,
    ) -> Result<TransitionCheck, TransitionRejection> {
        let from =
            find_status(self.statuses, current, None).ok_or(TransitionRejection::UnknownCurrent)?;
        if from.is_terminal {
            return Err(TransitionRejection::Terminal);
        }
        if !from.allows_transition_to(target) {
            return Err(TransitionRejection::NotAllowed);
        }

        let to = find_status(self.statuses, target, Some(from.category))
            .ok_or(TransitionRejection::UnknownTarget)?;
        if !to.is_active {
            return Err(TransitionRejection::InactiveTarget);
        }

        Ok(TransitionCheck {
            from: from.name.clone(),
            to: to.name.clone(),
            from_category: from.category,
            to_category: to.category,
            promotion: from.category == StatusCategory::Quote
                && to.category == StatusCategory::Order,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::status::{StatusCategory, StatusConfig};

    use super::{find_status, TransitionRejection, TransitionValidator};

    fn status(
        category: StatusCategory,
        name: &str,
        order: i32,
        terminal: bool,
        transitions: &[&str],
    ) -> StatusConfig {
        let mut status = StatusConfig::placeholder(category, name, order);
        status.is_terminal = terminal;
        status.allowed_transitions = transitions.iter().map(|name| name.to_string()).collect();
        status
    }

    fn review_graph() -> Vec<StatusConfig> {
        vec![
            status(StatusCategory::Quote, "pending_review", 1, false, &["approved", "rejected"]),
            status(StatusCategory::Quote, "approved", 2, true, &[]),
            status(StatusCategory::Quote, "rejected", 3, true, &[]),
        ]
    }

    #[test]
    fn review_graph_allows_listed_moves_only() {
        let statuses = review_graph();
        let validator = TransitionValidator::new(&statuses);

        assert!(validator.is_transition_allowed("pending_review", "approved"));
        assert!(validator.is_transition_allowed("pending_review", "rejected"));
        assert!(!validator.is_transition_allowed("approved", "pending_review"));
        assert!(!validator.is_transition_allowed("pending_review", "expired"));
    }

    #[test]
    fn terminal_status_blocks_every_target_even_when_listed() {
        let mut statuses = review_graph();
        statuses[1].allowed_transitions = vec!["pending_review".to_string()];
        let validator = TransitionValidator::new(&statuses);

        for target in ["pending_review", "approved", "rejected", "anything"] {
            assert!(!validator.is_transition_allowed("approved", target));
        }
        assert!(validator.list_reachable_statuses("approved").is_empty());
        assert_eq!(
            validator.check_transition("approved", "pending_review"),
            Err(TransitionRejection::Terminal)
        );
    }

    #[test]
    fn unknown_current_status_fails_closed() {
        let statuses = review_graph();
        let validator = TransitionValidator::new(&statuses);

        assert!(!validator.is_transition_allowed("ghost", "approved"));
        assert!(validator.list_reachable_statuses("ghost").is_empty());
        assert_eq!(
            validator.check_transition("ghost", "approved"),
            Err(TransitionRejection::UnknownCurrent)
        );
    }

    #[test]
    fn inactive_target_is_never_offered() {
        let mut statuses = review_graph();
        statuses[2].is_active = false;
        let validator = TransitionValidator::new(&statuses);

        assert_eq!(validator.list_reachable_statuses("pending_review"), vec!["approved"]);
        assert_eq!(
            validator.check_transition("pending_review", "rejected"),
            Err(TransitionRejection::InactiveTarget)
        );
    }

    #[test]
    fn retired_target_missing_from_configuration_is_dropped() {
        let mut statuses = review_graph();
        statuses[0].allowed_transitions.push("on_hold".to_string());
        let validator = TransitionValidator::new(&statuses);

        assert!(validator.is_transition_allowed("pending_review", "on_hold"));
        assert!(!validator.list_reachable_statuses("pending_review").contains(&"on_hold".into()));
        assert_eq!(
            validator.check_transition("pending_review", "on_hold"),
            Err(TransitionRejection::UnknownTarget)
        );
    }

    #[test]
    fn quote_to_order_edge_is_a_promotion() {
        let mut statuses = review_graph();
        statuses[1].is_terminal = false;
        statuses[1].allowed_transitions = vec!["pending_payment".to_string()];
        statuses.push(status(StatusCategory::Order, "pending_payment", 1, false, &["paid"]));
        statuses.push(status(StatusCategory::Order, "paid", 2, false, &[]));
        let validator = TransitionValidator::new(&statuses);

        let check = validator.check_transition("approved", "pending_payment").expect("promotion");
        assert!(check.promotion);
        assert_eq!(check.to_category, StatusCategory::Order);

        let same_category = validator.check_transition("pending_payment", "paid").expect("move");
        assert!(!same_category.promotion);
    }

    #[test]
    fn target_lookup_prefers_current_category_on_name_clash() {
        let statuses = vec![
            status(StatusCategory::Order, "pending", 1, false, &[]),
            status(StatusCategory::Quote, "draft", 1, false, &["pending"]),
            status(StatusCategory::Quote, "pending", 2, false, &[]),
        ];

        let found = find_status(&statuses, "pending", Some(StatusCategory::Quote)).expect("found");
        assert_eq!(found.category, StatusCategory::Quote);

        let check = TransitionValidator::new(&statuses)
            .check_transition("draft", "pending")
            .expect("same-category move");
        assert!(!check.promotion);
    }

    #[test]
    fn reachable_list_keeps_configured_order_without_duplicates() {
        let statuses = vec![
            status(StatusCategory::Quote, "sent", 1, false, &["rejected", "approved", "rejected"]),
            status(StatusCategory::Quote, "approved", 2, false, &[]),
            status(StatusCategory::Quote, "rejected", 3, false, &[]),
        ];

        let reachable = TransitionValidator::new(&statuses).list_reachable_statuses("sent");
        assert_eq!(reachable, vec!["rejected", "approved"]);
    }
}
