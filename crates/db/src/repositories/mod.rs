use thiserror::Error;

use orderflow_core::workflow::store::StoreError;

pub mod memory;
pub mod status_config;

pub use memory::InMemoryStatusStore;
pub use status_config::SqlStatusStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(error) => StoreError::Backend(error.to_string()),
            RepositoryError::Decode(message) => StoreError::Decode(message),
            RepositoryError::Conflict { expected, actual } => {
                StoreError::Conflict { expected, actual }
            }
        }
    }
}
