use serde_json::json;

use orderflow_core::errors::DomainError;
use orderflow_core::workflow::engine::WorkflowEngine;

use crate::commands::statuses::{all_statuses, load_snapshot};
use crate::commands::{to_json, CommandResult};

pub fn run(from: &str, to: &str) -> CommandResult {
    let snapshot = match load_snapshot("check-transition") {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };
    let statuses = all_statuses(&snapshot);

    match WorkflowEngine::default().apply_transition("cli", from, to, &statuses) {
        Ok(applied) => CommandResult::success_with_data(
            "check-transition",
            format!("`{}` may move to `{}`", applied.from, applied.to),
            json!({
                "from": applied.from,
                "to": applied.to,
                "toCategory": applied.to_category,
                "promotion": applied.promotion,
                "emailTemplate": applied.notification.map(|notification| notification.email_template),
            }),
        ),
        Err(DomainError::InvalidTransition { from, to, reason }) => {
            CommandResult::failure_with_data(
                "check-transition",
                "transition_rejected",
                format!("`{from}` may not move to `{to}`: {reason}"),
                8,
                json!({ "from": from, "to": to, "reason": to_json(&reason) }),
            )
        }
        Err(error) => CommandResult::failure("check-transition", "domain", error.to_string(), 8),
    }
}
