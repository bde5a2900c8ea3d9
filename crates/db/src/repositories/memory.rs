use async_trait::async_trait;
use tokio::sync::RwLock;

use orderflow_core::domain::status::{StatusCategory, StatusConfig};
use orderflow_core::workflow::store::{StatusSnapshot, StatusStore, StoreError};

/// Process-local store for tests and dry runs.
#[derive(Default)]
pub struct InMemoryStatusStore {
    state: RwLock<StatusSnapshot>,
}

impl InMemoryStatusStore {
    pub fn with_statuses(quote: Vec<StatusConfig>, order: Vec<StatusConfig>) -> Self {
        Self { state: RwLock::new(StatusSnapshot { revision: 0, quote, order }) }
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn get(&self, category: StatusCategory) -> Result<Vec<StatusConfig>, StoreError> {
        let state = self.state.read().await;
        let mut statuses = state.category(category).to_vec();
        statuses.sort_by_key(|status| status.order);
        Ok(statuses)
    }

    async fn revision(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().await.revision)
    }

    async fn snapshot(&self) -> Result<StatusSnapshot, StoreError> {
        Ok(self.state.read().await.clone())
    }

    async fn put_all(
        &self,
        expected_revision: u64,
        quote: &[StatusConfig],
        order: &[StatusConfig],
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        if state.revision != expected_revision {
            return Err(StoreError::Conflict { expected: expected_revision, actual: state.revision });
        }
        state.quote = quote.to_vec();
        state.order = order.to_vec();
        state.revision += 1;
        Ok(state.revision)
    }
}

#[cfg(test)]
mod tests {
    use orderflow_core::domain::status::{StatusCategory, StatusConfig};
    use orderflow_core::workflow::store::{StatusStore, StoreError};

    use super::InMemoryStatusStore;

    #[tokio::test]
    async fn put_all_replaces_both_categories_and_bumps_revision() {
        let store = InMemoryStatusStore::default();
        let quote = vec![StatusConfig::placeholder(StatusCategory::Quote, "pending", 1)];
        let order = vec![StatusConfig::placeholder(StatusCategory::Order, "processing", 1)];

        let revision = store.put_all(0, &quote, &order).await.expect("write");

        assert_eq!(revision, 1);
        assert_eq!(store.get(StatusCategory::Quote).await.expect("quote"), quote);
        assert_eq!(store.get(StatusCategory::Order).await.expect("order"), order);
    }

    #[tokio::test]
    async fn write_against_old_revision_conflicts() {
        let store = InMemoryStatusStore::default();
        store.put_all(0, &[], &[]).await.expect("first write");

        let error = store.put_all(0, &[], &[]).await.expect_err("stale write");
        assert_eq!(error, StoreError::Conflict { expected: 0, actual: 1 });
    }
}
