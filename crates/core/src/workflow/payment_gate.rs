use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::payment::PaymentState;
use crate::domain::status::{
    PaymentMilestone, PaymentRequiredBefore, PaymentType, PaymentValidationRule, StatusConfig,
};

pub const DEFAULT_MIN_PAYMENT_PERCENTAGE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const FULL_PAYMENT: Decimal = Decimal::ONE_HUNDRED;

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateBlockReason {
    #[error("{paid}% has been paid but {required}% is required")]
    InsufficientPayment { required: Decimal, paid: Decimal },
    #[error("the customer's phone number must be verified for cash on delivery")]
    VerificationRequired,
    #[error("payment milestone `{label}` ({percentage}%) has not been reached")]
    MilestoneUnmet { label: String, percentage: Decimal },
    #[error("cash on delivery is not accepted in this status")]
    CodNotAccepted,
    #[error("cash on delivery has not been collected yet")]
    CodCollectionPending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    pub allowed: bool,
    pub reason: Option<GateBlockReason>,
}

impl GateResult {
    fn allow() -> Self {
        Self { allowed: true, reason: None }
    }

    fn deny(reason: GateBlockReason) -> Self {
        Self { allowed: false, reason: Some(reason) }
    }

    pub fn into_result(self) -> Result<(), GateBlockReason> {
        match self.reason {
            Some(reason) if !self.allowed => Err(reason),
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneEvaluation {
    pub satisfied: Vec<PaymentMilestone>,
    pub unsatisfied_required: Vec<PaymentMilestone>,
}

impl MilestoneEvaluation {
    pub fn all_required_met(&self) -> bool {
        self.unsatisfied_required.is_empty()
    }
}

/// Decides whether shipping or completion may go ahead given a status'
/// payment rules and the entity's payment snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentGateEvaluator {
    default_min_payment_percentage: Decimal,
}

impl Default for PaymentGateEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PAYMENT_PERCENTAGE)
    }
}

impl PaymentGateEvaluator {
    pub fn new(default_min_payment_percentage: Decimal) -> Self {
        Self { default_min_payment_percentage }
    }

    pub fn can_proceed_to_ship(&self, status: &StatusConfig, payment: &PaymentState) -> GateResult {
        let requirement = status.payment_required_before;
        if requirement == Some(PaymentRequiredBefore::Never) {
            return GateResult::allow();
        }

        // COD verification applies to any other deadline, including none.
        if status.payment_type == Some(PaymentType::Cod) && status.allow_cod {
            if status.cod_verification_required && !payment.phone_verified {
                return GateResult::deny(GateBlockReason::VerificationRequired);
            }
            return GateResult::allow();
        }

        if status.payment_validation_rule == PaymentValidationRule::Strict {
            if let Some(milestone) = self.first_unmet_required(status, payment) {
                return GateResult::deny(milestone);
            }
        }

        match status.payment_type {
            Some(PaymentType::Cod) => GateResult::deny(GateBlockReason::CodNotAccepted),
            Some(PaymentType::Partial) | Some(PaymentType::Mixed) => {
                require_paid(self.min_payment_percentage(status), payment)
            }
            Some(PaymentType::Prepaid) | None if requirement.is_some() => {
                require_paid(FULL_PAYMENT, payment)
            }
            Some(PaymentType::Prepaid) | None => GateResult::allow(),
        }
    }

    /// Completion needs every required milestone plus settlement of whatever
    /// the payment type still owes.
    pub fn can_proceed_to_complete(
        &self,
        status: &StatusConfig,
        payment: &PaymentState,
    ) -> GateResult {
        if let Some(milestone) = self.first_unmet_required(status, payment) {
            return GateResult::deny(milestone);
        }

        let requirement = status.payment_required_before;
        if requirement == Some(PaymentRequiredBefore::Never) {
            return GateResult::allow();
        }

        match status.payment_type {
            Some(PaymentType::Cod) => {
                if !status.allow_cod {
                    GateResult::deny(GateBlockReason::CodNotAccepted)
                } else if status.cod_collection_required && !payment.cod_collected {
                    GateResult::deny(GateBlockReason::CodCollectionPending)
                } else {
                    GateResult::allow()
                }
            }
            _ if requirement.is_some() => require_paid(FULL_PAYMENT, payment),
            Some(PaymentType::Partial) | Some(PaymentType::Mixed) => {
                require_paid(self.min_payment_percentage(status), payment)
            }
            Some(PaymentType::Prepaid) | None => GateResult::allow(),
        }
    }

    pub fn evaluate_milestones(
        &self,
        status: &StatusConfig,
        payment: &PaymentState,
    ) -> MilestoneEvaluation {
        let mut evaluation = MilestoneEvaluation::default();
        for milestone in &status.payment_milestones {
            if payment.percentage_paid >= milestone.percentage {
                evaluation.satisfied.push(milestone.clone());
            } else if milestone.required {
                evaluation.unsatisfied_required.push(milestone.clone());
            }
        }
        evaluation
    }

    pub fn min_payment_percentage(&self, status: &StatusConfig) -> Decimal {
        status.min_payment_percentage.unwrap_or(self.default_min_payment_percentage)
    }

    fn first_unmet_required(
        &self,
        status: &StatusConfig,
        payment: &PaymentState,
    ) -> Option<GateBlockReason> {
        self.evaluate_milestones(status, payment).unsatisfied_required.into_iter().next().map(
            |milestone| GateBlockReason::MilestoneUnmet {
                label: milestone.label,
                percentage: milestone.percentage,
            },
        )
    }
}

fn require_paid(required: Decimal, payment: &PaymentState) -> GateResult {
    if payment.percentage_paid >= required {
        GateResult::allow()
    } else {
        GateResult::deny(GateBlockReason::InsufficientPayment {
            required,
            paid: payment.percentage_paid,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::payment::PaymentState;
    use crate::domain::status::{
        PaymentMilestone, PaymentRequiredBefore, PaymentType, PaymentValidationRule,
        StatusCategory, StatusConfig,
    };

    use super::{GateBlockReason, PaymentGateEvaluator, DEFAULT_MIN_PAYMENT_PERCENTAGE};

    fn order_status(payment_type: PaymentType, before: Option<PaymentRequiredBefore>) -> StatusConfig {
        let mut status = StatusConfig::placeholder(StatusCategory::Order, "ready_to_ship", 3);
        status.payment_type = Some(payment_type);
        status.payment_required_before = before;
        status
    }

    fn pct(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    fn milestone(percentage: i64, label: &str, required: bool) -> PaymentMilestone {
        PaymentMilestone { percentage: pct(percentage), label: label.to_string(), required }
    }

    #[test]
    fn default_minimum_is_fifty_percent() {
        assert_eq!(DEFAULT_MIN_PAYMENT_PERCENTAGE, pct(50));
    }

    #[test]
    fn never_requirement_always_ships() {
        let status = order_status(PaymentType::Prepaid, Some(PaymentRequiredBefore::Never));
        let result = PaymentGateEvaluator::default().can_proceed_to_ship(&status, &PaymentState::paid(pct(0)));
        assert!(result.allowed);
        assert_eq!(result.reason, None);
    }

    #[test]
    fn prepaid_before_shipping_needs_full_payment() {
        let status = order_status(PaymentType::Prepaid, Some(PaymentRequiredBefore::Shipping));
        let gate = PaymentGateEvaluator::default();

        let blocked = gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(99)));
        assert!(!blocked.allowed);
        assert_eq!(
            blocked.reason,
            Some(GateBlockReason::InsufficientPayment { required: pct(100), paid: pct(99) })
        );

        let allowed = gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(100)));
        assert!(allowed.allowed);
    }

    #[test]
    fn prepaid_requirement_at_any_stage_gates_shipping() {
        let gate = PaymentGateEvaluator::default();
        for before in [
            PaymentRequiredBefore::Processing,
            PaymentRequiredBefore::Shipping,
            PaymentRequiredBefore::Completion,
        ] {
            let status = order_status(PaymentType::Prepaid, Some(before));
            assert!(!gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(60))).allowed);
        }
    }

    #[test]
    fn partial_payment_threshold_is_inclusive() {
        let mut status = order_status(PaymentType::Partial, Some(PaymentRequiredBefore::Shipping));
        status.min_payment_percentage = Some(pct(50));
        let gate = PaymentGateEvaluator::default();

        assert!(gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(50))).allowed);

        let blocked = gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(49)));
        assert!(!blocked.allowed);
        assert!(matches!(blocked.reason, Some(GateBlockReason::InsufficientPayment { .. })));
    }

    #[test]
    fn partial_without_deadline_still_enforces_minimum() {
        let mut status = order_status(PaymentType::Partial, None);
        status.min_payment_percentage = Some(pct(50));
        let gate = PaymentGateEvaluator::default();

        assert!(gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(50))).allowed);
        assert!(!gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(49))).allowed);
    }

    #[test]
    fn mixed_payment_falls_back_to_configured_default_minimum() {
        let status = order_status(PaymentType::Mixed, Some(PaymentRequiredBefore::Processing));

        let default_gate = PaymentGateEvaluator::default();
        assert!(default_gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(50))).allowed);

        let stricter_gate = PaymentGateEvaluator::new(pct(75));
        let blocked = stricter_gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(50)));
        assert_eq!(
            blocked.reason,
            Some(GateBlockReason::InsufficientPayment { required: pct(75), paid: pct(50) })
        );
    }

    #[test]
    fn cod_requires_phone_verification_when_configured() {
        let mut status = order_status(PaymentType::Cod, Some(PaymentRequiredBefore::Shipping));
        status.allow_cod = true;
        status.cod_verification_required = true;
        let gate = PaymentGateEvaluator::default();

        let unverified = PaymentState::paid(pct(0)).with_phone_verified(false);
        let blocked = gate.can_proceed_to_ship(&status, &unverified);
        assert!(!blocked.allowed);
        assert_eq!(blocked.reason, Some(GateBlockReason::VerificationRequired));

        let verified = PaymentState::paid(pct(0)).with_phone_verified(true);
        assert!(gate.can_proceed_to_ship(&status, &verified).allowed);
    }

    #[test]
    fn cod_verification_applies_without_payment_deadline() {
        let mut status = order_status(PaymentType::Cod, None);
        status.allow_cod = true;
        status.cod_verification_required = true;

        let result = PaymentGateEvaluator::default()
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(0)));
        assert_eq!(result.reason, Some(GateBlockReason::VerificationRequired));
    }

    #[test]
    fn never_requirement_ships_cod_without_phone_verification() {
        let mut status = order_status(PaymentType::Cod, Some(PaymentRequiredBefore::Never));
        status.allow_cod = true;
        status.cod_verification_required = true;

        let result = PaymentGateEvaluator::default()
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(0)));
        assert!(result.allowed);
        assert_eq!(result.reason, None);
    }

    #[test]
    fn cod_status_without_cod_acceptance_is_blocked() {
        let status = order_status(PaymentType::Cod, Some(PaymentRequiredBefore::Shipping));
        let result = PaymentGateEvaluator::default()
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(100)));
        assert_eq!(result.reason, Some(GateBlockReason::CodNotAccepted));
    }

    #[test]
    fn untyped_status_with_deadline_is_treated_as_prepaid() {
        let mut status = StatusConfig::placeholder(StatusCategory::Order, "processing", 2);
        status.payment_required_before = Some(PaymentRequiredBefore::Processing);

        let result = PaymentGateEvaluator::default()
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(80)));
        assert!(!result.allowed);
    }

    #[test]
    fn milestones_split_into_satisfied_and_unmet_required() {
        let mut status = order_status(PaymentType::Mixed, Some(PaymentRequiredBefore::Completion));
        status.payment_milestones = vec![
            milestone(30, "Deposit", true),
            milestone(60, "Pre-shipment", false),
            milestone(100, "Balance", true),
        ];

        let evaluation = PaymentGateEvaluator::default()
            .evaluate_milestones(&status, &PaymentState::paid(pct(30)));

        assert_eq!(evaluation.satisfied, vec![milestone(30, "Deposit", true)]);
        assert_eq!(evaluation.unsatisfied_required, vec![milestone(100, "Balance", true)]);
        assert!(!evaluation.all_required_met());
    }

    #[test]
    fn completion_is_blocked_by_first_unmet_required_milestone() {
        let mut status = order_status(PaymentType::Mixed, Some(PaymentRequiredBefore::Completion));
        status.payment_milestones =
            vec![milestone(30, "Deposit", true), milestone(100, "Balance", true)];
        let gate = PaymentGateEvaluator::default();

        let blocked = gate.can_proceed_to_complete(&status, &PaymentState::paid(pct(40)));
        assert_eq!(
            blocked.reason,
            Some(GateBlockReason::MilestoneUnmet { label: "Balance".to_string(), percentage: pct(100) })
        );

        assert!(gate.can_proceed_to_complete(&status, &PaymentState::paid(pct(100))).allowed);
    }

    #[test]
    fn completion_of_cod_order_waits_for_collection() {
        let mut status = order_status(PaymentType::Cod, Some(PaymentRequiredBefore::Completion));
        status.allow_cod = true;
        status.cod_collection_required = true;
        let gate = PaymentGateEvaluator::default();

        let pending = gate.can_proceed_to_complete(&status, &PaymentState::paid(pct(0)));
        assert_eq!(pending.reason, Some(GateBlockReason::CodCollectionPending));

        let collected = PaymentState::paid(pct(0)).with_cod_collected(true);
        assert!(gate.can_proceed_to_complete(&status, &collected).allowed);
    }

    #[test]
    fn strict_rule_checks_required_milestones_before_shipping() {
        let mut status = order_status(PaymentType::Partial, Some(PaymentRequiredBefore::Shipping));
        status.payment_validation_rule = PaymentValidationRule::Strict;
        status.payment_milestones = vec![milestone(70, "Production deposit", true)];

        let result = PaymentGateEvaluator::default()
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(60)));
        assert!(matches!(result.reason, Some(GateBlockReason::MilestoneUnmet { .. })));
    }

    #[test]
    fn gate_result_converts_into_typed_error() {
        let status = order_status(PaymentType::Prepaid, Some(PaymentRequiredBefore::Shipping));
        let gate = PaymentGateEvaluator::default();

        let error = gate
            .can_proceed_to_ship(&status, &PaymentState::paid(pct(10)))
            .into_result()
            .expect_err("blocked gate converts to error");
        assert!(error.to_string().contains("100"));
        assert!(gate.can_proceed_to_ship(&status, &PaymentState::paid(pct(100))).into_result().is_ok());
    }
}
