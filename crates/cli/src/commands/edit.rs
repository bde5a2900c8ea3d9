use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use orderflow_core::config::AppConfig;
use orderflow_core::domain::status::{StatusCategory, StatusId};
use orderflow_core::errors::ApplicationError;
use orderflow_core::workflow::registry::{
    CommitReport, RegistryError, ReorderDirection, StatusRegistry,
};

use orderflow_db::SqlStatusStore;

use crate::commands::{load_config, open_store, runtime, to_json, CommandResult};

const COMMAND: &str = "edit";

/// One admin edit, applied to a fresh draft and persisted straight away.
#[derive(Debug, Clone)]
pub enum EditAction {
    Add { category: StatusCategory, name: Option<String> },
    Patch { category: StatusCategory, name: String, json: String },
    Remove { category: StatusCategory, name: String },
    Move { category: StatusCategory, name: String, direction: ReorderDirection },
}

pub fn run(action: EditAction) -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    runtime.block_on(async {
        let (pool, store) = match open_store(&config).await {
            Ok(opened) => opened,
            Err((error_class, message, exit_code)) => {
                return CommandResult::failure(COMMAND, error_class, message, exit_code)
            }
        };

        let result = execute(&config, &store, &action).await;
        pool.close().await;
        result.unwrap_or_else(|failure| failure)
    })
}

async fn execute(
    config: &AppConfig,
    store: &SqlStatusStore,
    action: &EditAction,
) -> Result<CommandResult, CommandResult> {
    let mut registry = StatusRegistry::load(store)
        .await
        .map_err(registry_failure)?
        .with_persist_timeout(config.workflow.persist_timeout());

    let summary = apply(&mut registry, action)?;
    if !registry.has_unsaved_changes() {
        return Ok(CommandResult::success_with_data(
            COMMAND,
            format!("{summary}; nothing to persist"),
            json!({ "revision": registry.revision(), "changed": false }),
        ));
    }

    let report = registry.persist(store).await.map_err(registry_failure)?;
    info!(event_name = "cli.edit.persisted", revision = report.revision, "status edit persisted");
    Ok(CommandResult::success_with_data(
        COMMAND,
        format!("{summary}; saved as revision {}", report.revision),
        commit_data(&report),
    ))
}

fn apply(registry: &mut StatusRegistry, action: &EditAction) -> Result<String, CommandResult> {
    match action {
        EditAction::Add { category, name } => {
            let id = registry.add(*category);
            if let Some(name) = name {
                let name = name.clone();
                registry
                    .update(&id, move |status| {
                        status.label = name.clone();
                        status.name = name;
                    })
                    .map_err(registry_failure)?;
            }
            let added = registry.get(&id).map(|status| status.name.clone()).unwrap_or_default();
            Ok(format!("added {category} status `{added}`"))
        }
        EditAction::Patch { category, name, json } => {
            let id = resolve(registry, *category, name)?;
            let patch: Value = serde_json::from_str(json).map_err(|error| {
                CommandResult::failure(
                    COMMAND,
                    "invalid_patch",
                    format!("patch is not valid JSON: {error}"),
                    7,
                )
            })?;
            registry.apply_patch(&id, &patch).map_err(registry_failure)?;
            Ok(format!("patched {category} status `{name}`"))
        }
        EditAction::Remove { category, name } => {
            let id = resolve(registry, *category, name)?;
            registry.remove(&id).map_err(registry_failure)?;
            Ok(format!("removed {category} status `{name}`"))
        }
        EditAction::Move { category, name, direction } => {
            let id = resolve(registry, *category, name)?;
            let moved = registry.reorder(&id, *direction).map_err(registry_failure)?;
            Ok(if moved {
                format!("moved {category} status `{name}` {}", direction_label(*direction))
            } else {
                format!("{category} status `{name}` is already at the boundary")
            })
        }
    }
}

fn resolve(
    registry: &StatusRegistry,
    category: StatusCategory,
    name: &str,
) -> Result<StatusId, CommandResult> {
    registry.find_by_name(category, name).map(|status| status.id.clone()).ok_or_else(|| {
        CommandResult::failure(
            COMMAND,
            "unknown_status",
            format!("{category} status `{name}` is not configured"),
            9,
        )
    })
}

/// Maps a registry failure through the application error layers so the
/// outcome carries a user-safe message and a correlation id for the logs.
fn registry_failure(error: RegistryError) -> CommandResult {
    let (error_class, exit_code) = match &error {
        RegistryError::NotFound(_) => ("unknown_status", 9),
        RegistryError::Validation(_) => ("config_invalid", 7),
        RegistryError::Store(_) => ("store_write", 6),
        RegistryError::Timeout { .. } => ("persist_timeout", 10),
    };
    let issues = match &error {
        RegistryError::Validation(report) => to_json(&report.issues),
        _ => json!([]),
    };

    let correlation_id = Uuid::new_v4().to_string();
    let interface = ApplicationError::from(error).into_interface(correlation_id.clone());
    warn!(
        event_name = "cli.edit.failed",
        correlation_id = %correlation_id,
        error_class,
        error = %interface,
        "status edit failed"
    );

    CommandResult::failure_with_data(
        COMMAND,
        error_class,
        interface.to_string(),
        exit_code,
        json!({
            "correlationId": correlation_id,
            "userMessage": interface.user_message(),
            "issues": issues,
        }),
    )
}

fn commit_data(report: &CommitReport) -> Value {
    let assigned: Vec<Value> = report
        .assigned_ids
        .iter()
        .map(|(temporary, permanent)| {
            json!({ "temporary": temporary.to_string(), "permanent": permanent.to_string() })
        })
        .collect();
    json!({
        "revision": report.revision,
        "changed": true,
        "diff": to_json(&report.diff),
        "assignedIds": assigned,
    })
}

fn direction_label(direction: ReorderDirection) -> &'static str {
    match direction {
        ReorderDirection::Up => "up",
        ReorderDirection::Down => "down",
    }
}
