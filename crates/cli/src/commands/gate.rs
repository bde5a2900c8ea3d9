use rust_decimal::Decimal;
use serde_json::json;

use orderflow_core::domain::payment::PaymentState;
use orderflow_core::domain::status::StatusCategory;
use orderflow_core::workflow::payment_gate::PaymentGateEvaluator;
use orderflow_core::workflow::transitions::find_status;

use crate::commands::statuses::{all_statuses, load_snapshot};
use crate::commands::{load_config, to_json, CommandResult};

#[derive(Debug, Clone)]
pub struct GateArgs {
    pub status: String,
    pub category: Option<StatusCategory>,
    pub paid: Decimal,
    pub phone_verified: bool,
    pub cod_collected: bool,
}

/// Reports both payment gates for a status. Blocked gates are a normal
/// answer, not a command failure.
pub fn run(args: GateArgs) -> CommandResult {
    let config = match load_config("gate") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let snapshot = match load_snapshot("gate") {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };
    let statuses = all_statuses(&snapshot);

    let Some(status) = find_status(&statuses, &args.status, args.category) else {
        return CommandResult::failure(
            "gate",
            "unknown_status",
            format!("status `{}` is not configured", args.status),
            9,
        );
    };

    let evaluator = PaymentGateEvaluator::new(config.workflow.default_min_payment_percentage);
    let payment = PaymentState::paid(args.paid)
        .with_phone_verified(args.phone_verified)
        .with_cod_collected(args.cod_collected);

    let ship = evaluator.can_proceed_to_ship(status, &payment);
    let complete = evaluator.can_proceed_to_complete(status, &payment);
    let milestones = evaluator.evaluate_milestones(status, &payment);

    CommandResult::success_with_data(
        "gate",
        format!(
            "ship {}, complete {}",
            if ship.allowed { "allowed" } else { "blocked" },
            if complete.allowed { "allowed" } else { "blocked" }
        ),
        json!({
            "status": status.name,
            "category": status.category,
            "payment": to_json(&payment),
            "ship": to_json(&ship),
            "complete": to_json(&complete),
            "milestones": to_json(&milestones),
        }),
    )
}
