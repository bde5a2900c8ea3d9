use rust_decimal::Decimal;

use crate::domain::status::{
    PaymentMilestone, PaymentRequiredBefore, PaymentType, PaymentValidationRule, StatusCategory,
    StatusConfig, StatusId,
};

/// Starter configuration written by `orderflow seed`.
pub fn default_quote_statuses() -> Vec<StatusConfig> {
    let mut pending = base(StatusCategory::Quote, "pending", "Pending", 1, "yellow", 10);
    pending.is_default_quote_status = true;
    pending.allowed_transitions = names(&["calculated", "rejected"]);
    pending.allow_edit = Some(true);
    pending.allow_address_edit = Some(true);
    pending.allow_cancellation = Some(true);
    pending.show_in_customer_view = true;
    pending.customer_message = Some("We are preparing your quote.".into());

    let mut calculated = base(StatusCategory::Quote, "calculated", "Calculated", 2, "blue", 30);
    calculated.allowed_transitions = names(&["sent", "pending"]);
    calculated.allow_edit = Some(true);
    calculated.show_in_customer_view = false;

    let mut sent = base(StatusCategory::Quote, "sent", "Sent", 3, "indigo", 50);
    sent.allowed_transitions = names(&["approved", "rejected", "expired"]);
    sent.triggers_email = true;
    sent.email_template = Some("quote_sent".into());
    sent.auto_expire_hours = Some(72);
    sent.show_expiration = true;
    sent.allow_approval = Some(true);
    sent.allow_rejection = Some(true);
    sent.allow_cart_actions = Some(true);
    sent.requires_action = Some(true);
    sent.customer_action_text = Some("Review and approve your quote".into());

    let mut approved = base(StatusCategory::Quote, "approved", "Approved", 4, "green", 70);
    approved.allowed_transitions = names(&["pending_payment"]);
    approved.is_successful = true;
    approved.triggers_email = true;
    approved.email_template = Some("quote_approved".into());

    let mut rejected = base(StatusCategory::Quote, "rejected", "Rejected", 5, "red", 100);
    rejected.is_terminal = true;
    rejected.allow_renewal = Some(true);

    let mut expired = base(StatusCategory::Quote, "expired", "Expired", 6, "gray", 100);
    expired.is_terminal = true;
    expired.allow_renewal = Some(true);

    vec![pending, calculated, sent, approved, rejected, expired]
}

pub fn default_order_statuses() -> Vec<StatusConfig> {
    let mut pending_payment =
        base(StatusCategory::Order, "pending_payment", "Pending Payment", 1, "yellow", 10);
    pending_payment.allowed_transitions = names(&["processing", "cancelled"]);
    pending_payment.counts_as_order = true;
    pending_payment.can_be_paid = Some(true);
    pending_payment.allow_address_edit = Some(true);
    pending_payment.allow_cancellation = Some(true);
    pending_payment.requires_action = Some(true);
    pending_payment.payment_type = Some(PaymentType::Partial);
    pending_payment.payment_required_before = Some(PaymentRequiredBefore::Processing);
    pending_payment.customer_action_text = Some("Complete your payment".into());

    let mut processing = base(StatusCategory::Order, "processing", "Processing", 2, "blue", 40);
    processing.allowed_transitions = names(&["shipped", "cancelled"]);
    processing.counts_as_order = true;
    processing.can_be_paid = Some(true);
    processing.allow_shipping = Some(true);
    processing.allow_cancellation = Some(true);
    processing.payment_type = Some(PaymentType::Partial);
    processing.payment_required_before = Some(PaymentRequiredBefore::Shipping);
    processing.min_payment_percentage = Some(Decimal::new(50, 0));
    processing.payment_validation_rule = PaymentValidationRule::Standard;
    processing.payment_milestones = vec![
        PaymentMilestone { percentage: Decimal::new(50, 0), label: "Deposit".into(), required: true },
        PaymentMilestone {
            percentage: Decimal::ONE_HUNDRED,
            label: "Balance".into(),
            required: false,
        },
    ];

    let mut shipped = base(StatusCategory::Order, "shipped", "Shipped", 3, "indigo", 80);
    shipped.allowed_transitions = names(&["delivered"]);
    shipped.counts_as_order = true;
    shipped.triggers_email = true;
    shipped.email_template = Some("order_shipped".into());

    let mut delivered = base(StatusCategory::Order, "delivered", "Delivered", 4, "green", 100);
    delivered.is_terminal = true;
    delivered.is_successful = true;
    delivered.counts_as_order = true;

    let mut cancelled = base(StatusCategory::Order, "cancelled", "Cancelled", 5, "red", 100);
    cancelled.is_terminal = true;
    cancelled.triggers_email = true;
    cancelled.email_template = Some("order_cancelled".into());

    vec![pending_payment, processing, shipped, delivered, cancelled]
}

fn base(
    category: StatusCategory,
    name: &str,
    label: &str,
    order: i32,
    color: &str,
    progress: u8,
) -> StatusConfig {
    let mut status = StatusConfig::placeholder(category, name, order);
    status.id = StatusId(format!("status-{category}-{name}"));
    status.label = label.to_string();
    status.color = color.to_string();
    status.progress_percentage = progress;
    status.badge_variant = "default".to_string();
    status
}

fn names(targets: &[&str]) -> Vec<String> {
    targets.iter().map(|target| target.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use crate::workflow::transitions::TransitionValidator;
    use crate::workflow::validation::ConfigValidator;

    use super::{default_order_statuses, default_quote_statuses};

    #[test]
    fn starter_configuration_is_valid() {
        assert_eq!(ConfigValidator::validate(&default_quote_statuses(), &default_order_statuses()), Ok(()));
    }

    #[test]
    fn approved_quote_promotes_into_the_order_lifecycle() {
        let all: Vec<_> =
            default_quote_statuses().into_iter().chain(default_order_statuses()).collect();
        let check = TransitionValidator::new(&all)
            .check_transition("approved", "pending_payment")
            .expect("promotion edge");
        assert!(check.promotion);
        assert!(TransitionValidator::new(&all).list_reachable_statuses("delivered").is_empty());
    }
}
