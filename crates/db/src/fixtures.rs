use orderflow_core::domain::status::{StatusCategory, StatusConfig};
use orderflow_core::workflow::defaults::{default_order_statuses, default_quote_statuses};
use orderflow_core::workflow::validation::ConfigValidator;

use crate::connection::DbPool;
use crate::repositories::{RepositoryError, SqlStatusStore};

/// Starter quote and order statuses for a fresh database.
pub struct StatusSeedDataset;

impl StatusSeedDataset {
    pub fn quote_statuses() -> Vec<StatusConfig> {
        default_quote_statuses()
    }

    pub fn order_statuses() -> Vec<StatusConfig> {
        default_order_statuses()
    }

    /// Writes the starter configuration unless statuses already exist, in
    /// which case nothing is touched.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let store = SqlStatusStore::new(pool.clone());
        let existing = store.load_snapshot().await?;
        if !existing.quote.is_empty() || !existing.order.is_empty() {
            return Ok(SeedResult {
                revision: existing.revision,
                quote_statuses: existing.quote.len(),
                order_statuses: existing.order.len(),
                skipped: true,
            });
        }

        let quote = Self::quote_statuses();
        let order = Self::order_statuses();
        ConfigValidator::validate(&quote, &order)
            .map_err(|report| RepositoryError::Decode(report.to_string()))?;
        let revision = store.replace_all(existing.revision, &quote, &order).await?;

        Ok(SeedResult {
            revision,
            quote_statuses: quote.len(),
            order_statuses: order.len(),
            skipped: false,
        })
    }

    /// Checks that every starter status is present under its seeded name.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let store = SqlStatusStore::new(pool.clone());
        let mut checks = Vec::new();

        for (category, expected) in [
            (StatusCategory::Quote, Self::quote_statuses()),
            (StatusCategory::Order, Self::order_statuses()),
        ] {
            let stored = store.load_category(category).await?;
            for status in expected {
                let present = stored.iter().any(|candidate| candidate.name == status.name);
                checks.push((format!("{category}:{}", status.name), present));
            }
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub revision: u64,
    pub quote_statuses: usize,
    pub order_statuses: usize,
    pub skipped: bool,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}
