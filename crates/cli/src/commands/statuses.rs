use serde::Serialize;
use serde_json::json;

use orderflow_core::domain::status::{StatusCategory, StatusConfig};
use orderflow_core::workflow::permissions::{PermissionResolver, PermissionSet, StatusView};
use orderflow_core::workflow::store::{StatusSnapshot, StatusStore};
use orderflow_core::workflow::transitions::TransitionValidator;

use crate::commands::{load_config, open_store, runtime, to_json, CommandResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRow {
    name: String,
    label: String,
    order: i32,
    is_active: bool,
    is_terminal: bool,
    requires_action: bool,
    reachable: Vec<String>,
    permissions: PermissionSet,
}

pub fn run(category: StatusCategory, view: Option<StatusView>) -> CommandResult {
    let snapshot = match load_snapshot("statuses") {
        Ok(snapshot) => snapshot,
        Err(result) => return result,
    };

    // Own category first so same-named statuses resolve to this list.
    let ordered: Vec<StatusConfig> = snapshot
        .category(category)
        .iter()
        .chain(snapshot.category(category.other()))
        .cloned()
        .collect();
    let validator = TransitionValidator::new(&ordered);
    let listed: Vec<&StatusConfig> = match view {
        Some(view) => PermissionResolver::visible_in(snapshot.category(category), view),
        None => snapshot.category(category).iter().collect(),
    };

    let rows: Vec<StatusRow> = listed
        .into_iter()
        .map(|status| StatusRow {
            name: status.name.clone(),
            label: status.label.clone(),
            order: status.order,
            is_active: status.is_active,
            is_terminal: status.is_terminal,
            requires_action: PermissionResolver::requires_action(status),
            reachable: validator.list_reachable_statuses(&status.name),
            permissions: PermissionResolver::resolve(status),
        })
        .collect();

    CommandResult::success_with_data(
        "statuses",
        format!("{} {category} status(es)", rows.len()),
        json!({
            "category": category,
            "revision": snapshot.revision,
            "statuses": to_json(&rows),
        }),
    )
}

pub(crate) fn all_statuses(snapshot: &StatusSnapshot) -> Vec<StatusConfig> {
    snapshot.quote.iter().chain(snapshot.order.iter()).cloned().collect()
}

pub(crate) fn load_snapshot(command: &'static str) -> Result<StatusSnapshot, CommandResult> {
    let config = load_config(command)?;
    let runtime = runtime(command)?;

    runtime
        .block_on(async {
            let (pool, store) = open_store(&config).await?;
            let snapshot = store
                .snapshot()
                .await
                .map_err(|error| ("store_read", error.to_string(), 6u8));
            pool.close().await;
            snapshot
        })
        .map_err(|(error_class, message, exit_code)| {
            CommandResult::failure(command, error_class, message, exit_code)
        })
}
