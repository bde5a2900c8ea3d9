use async_trait::async_trait;
use thiserror::Error;

use crate::domain::status::{StatusCategory, StatusConfig};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("status configuration was changed by another session (expected revision {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("stored status could not be decoded: {0}")]
    Decode(String),
}

/// Both category lists as read at one store revision.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub revision: u64,
    pub quote: Vec<StatusConfig>,
    pub order: Vec<StatusConfig>,
}

impl StatusSnapshot {
    pub fn category(&self, category: StatusCategory) -> &[StatusConfig] {
        match category {
            StatusCategory::Quote => &self.quote,
            StatusCategory::Order => &self.order,
        }
    }
}

/// Persistent home of the status configuration.
///
/// `put_all` must replace both categories in one atomic step and only when the
/// stored revision still equals `expected_revision`; on any error nothing is
/// written.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, category: StatusCategory) -> Result<Vec<StatusConfig>, StoreError>;

    async fn revision(&self) -> Result<u64, StoreError>;

    async fn snapshot(&self) -> Result<StatusSnapshot, StoreError>;

    /// Returns the new revision.
    async fn put_all(
        &self,
        expected_revision: u64,
        quote: &[StatusConfig],
        order: &[StatusConfig],
    ) -> Result<u64, StoreError>;
}
