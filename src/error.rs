use crate::domain::account::AccountId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BonusError {
    /// The account does not exist. Retrying will not help.
    #[error("Account {0} not found")]
    NotFound(AccountId),
    /// The store could not lock or commit. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BonusError {
    /// Whether the caller may retry the operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BonusError::StoreUnavailable(_))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BonusError {
    fn from(err: rocksdb::Error) -> Self {
        BonusError::StoreUnavailable(err.into_string())
    }
}

pub type Result<T> = std::result::Result<T, BonusError>;
