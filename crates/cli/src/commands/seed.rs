use serde_json::json;

use orderflow_db::StatusSeedDataset;

use crate::commands::{load_config, open_store, runtime, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let (pool, _store) = open_store(&config).await?;

        let seeded = StatusSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = StatusSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let outcome: Result<_, CommandFailure> = if seeded.skipped || verification.all_present {
            Ok(seeded)
        } else {
            let failed_checks: Vec<String> = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then(|| check.clone()))
                .collect();
            Err(("seed_verification", verification_message(&failed_checks), 6u8))
        };

        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => {
            let message = if seeded.skipped {
                "status configuration already present; seed skipped".to_string()
            } else {
                format!(
                    "seeded {} quote and {} order statuses",
                    seeded.quote_statuses, seeded.order_statuses
                )
            };
            CommandResult::success_with_data(
                "seed",
                message,
                json!({
                    "revision": seeded.revision,
                    "quoteStatuses": seeded.quote_statuses,
                    "orderStatuses": seeded.order_statuses,
                    "skipped": seeded.skipped,
                }),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn verification_message(failed_checks: &[String]) -> String {
    if failed_checks.is_empty() {
        "some starter statuses failed to load".to_string()
    } else {
        format!("seed verification failed for: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let failed = vec!["quote:sent".to_string(), "order:shipped".to_string()];
        assert_eq!(verification_message(&failed), "seed verification failed for: quote:sent, order:shipped");
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_message(&[]), "some starter statuses failed to load");
    }
}
