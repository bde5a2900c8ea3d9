use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink};
use crate::domain::payment::PaymentState;
use crate::domain::status::{StatusCategory, StatusConfig};
use crate::errors::DomainError;
use crate::notifications::{NotificationDispatch, StatusNotification};
use crate::workflow::payment_gate::PaymentGateEvaluator;
use crate::workflow::permissions::{PermissionResolver, StatusAction};
use crate::workflow::transitions::{find_status, TransitionValidator};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransition {
    pub entity_id: String,
    pub from: String,
    pub to: String,
    pub to_category: StatusCategory,
    pub promotion: bool,
    pub notification: Option<StatusNotification>,
}

/// Moves quotes and orders between configured statuses and answers whether a
/// status lets an action through. Holds no entity state of its own.
#[derive(Clone, Debug, Default)]
pub struct WorkflowEngine {
    gate: PaymentGateEvaluator,
}

impl WorkflowEngine {
    pub fn new(gate: PaymentGateEvaluator) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &PaymentGateEvaluator {
        &self.gate
    }

    pub fn apply_transition(
        &self,
        entity_id: &str,
        current: &str,
        target: &str,
        statuses: &[StatusConfig],
    ) -> Result<AppliedTransition, DomainError> {
        let check = TransitionValidator::new(statuses).check_transition(current, target).map_err(
            |reason| DomainError::InvalidTransition {
                from: current.to_string(),
                to: target.to_string(),
                reason,
            },
        )?;

        let notification = find_status(statuses, &check.to, Some(check.to_category))
            .and_then(|status| StatusNotification::for_status(status, entity_id));

        debug!(
            event_name = "workflow.transition.checked",
            entity_id,
            from = %check.from,
            to = %check.to,
            promotion = check.promotion,
            "status transition accepted"
        );

        Ok(AppliedTransition {
            entity_id: entity_id.to_string(),
            from: check.from,
            to: check.to,
            to_category: check.to_category,
            promotion: check.promotion,
            notification,
        })
    }

    /// Like `apply_transition`, recording the outcome on `sink` and handing
    /// any notification to `dispatch`.
    pub fn apply_transition_with_audit<S, N>(
        &self,
        entity_id: &str,
        current: &str,
        target: &str,
        statuses: &[StatusConfig],
        sink: &S,
        dispatch: &N,
        audit: &AuditContext,
    ) -> Result<AppliedTransition, DomainError>
    where
        S: AuditSink,
        N: NotificationDispatch,
    {
        let result = self.apply_transition(entity_id, current, target, statuses);
        match &result {
            Ok(applied) => {
                sink.emit(
                    audit
                        .event(
                            "workflow.transition_applied",
                            AuditCategory::Transition,
                            AuditOutcome::Success,
                        )
                        .with_metadata("from", applied.from.clone())
                        .with_metadata("to", applied.to.clone())
                        .with_metadata("promotion", applied.promotion.to_string()),
                );
                if let Some(notification) = &applied.notification {
                    dispatch.dispatch(notification.clone());
                    sink.emit(
                        audit
                            .event(
                                "workflow.notification_queued",
                                AuditCategory::Notification,
                                AuditOutcome::Success,
                            )
                            .with_metadata("template", notification.email_template.clone()),
                    );
                }
                info!(
                    event_name = "workflow.transition.applied",
                    entity_id,
                    correlation_id = %audit.correlation_id,
                    from = %applied.from,
                    to = %applied.to,
                    "status transition applied"
                );
            }
            Err(error) => {
                sink.emit(
                    audit
                        .event(
                            "workflow.transition_rejected",
                            AuditCategory::Transition,
                            AuditOutcome::Rejected,
                        )
                        .with_metadata("from", current)
                        .with_metadata("to", target)
                        .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }

    /// Permission flag first, then the shipping payment gate for `Ship`.
    pub fn authorize_action(
        &self,
        status: &StatusConfig,
        action: StatusAction,
        payment: &PaymentState,
    ) -> Result<(), DomainError> {
        if !PermissionResolver::permits(status, action) {
            return Err(DomainError::ActionNotPermitted { status: status.name.clone(), action });
        }

        if action == StatusAction::Ship {
            self.gate.can_proceed_to_ship(status, payment).into_result().map_err(|reason| {
                DomainError::PaymentGateBlocked { status: status.name.clone(), reason }
            })?;
        }
        Ok(())
    }

    pub fn authorize_completion(
        &self,
        status: &StatusConfig,
        payment: &PaymentState,
    ) -> Result<(), DomainError> {
        self.gate
            .can_proceed_to_complete(status, payment)
            .into_result()
            .map_err(|reason| DomainError::PaymentGateBlocked { status: status.name.clone(), reason })
    }
}
