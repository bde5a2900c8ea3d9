use serde_json::json;

use orderflow_core::workflow::validation::ConfigValidator;

use crate::commands::statuses::load_snapshot;
use crate::commands::{to_json, CommandResult};

pub fn run() -> CommandResult {
    let snapshot = match load_snapshot("validate") {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };

    match ConfigValidator::validate(&snapshot.quote, &snapshot.order) {
        Ok(()) => CommandResult::success_with_data(
            "validate",
            format!(
                "{} quote and {} order statuses are consistent",
                snapshot.quote.len(),
                snapshot.order.len()
            ),
            json!({ "revision": snapshot.revision, "issues": [] }),
        ),
        Err(report) => CommandResult::failure_with_data(
            "validate",
            "config_invalid",
            report.to_string(),
            7,
            json!({ "revision": snapshot.revision, "issues": to_json(&report.issues) }),
        ),
    }
}
