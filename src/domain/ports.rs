use super::account::{Account, AccountId};
use super::log_entry::{LogEntry, Severity};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Mutation applied to a locked working copy of an account.
///
/// Returning `Ok(true)` asks the store to commit the copy, `Ok(false)` leaves
/// the record as it was. An error aborts the transaction.
pub type AccountUpdate = Box<dyn FnOnce(&mut Account) -> Result<bool> + Send>;

/// What a store transaction observed and whether it wrote anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// The record as it stands once the transaction finished.
    pub account: Account,
    pub committed: bool,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn store(&self, account: Account) -> Result<()>;
    /// Inserts `account` only when no record with its id exists yet.
    ///
    /// Returns `false` and leaves the stored record alone otherwise, so
    /// re-seeding never rolls a granted account back.
    async fn insert(&self, account: Account) -> Result<bool>;
    async fn get(&self, id: AccountId) -> Result<Option<Account>>;
    /// All accounts ordered by id.
    async fn get_all(&self) -> Result<Vec<Account>>;
    /// Locks the record for update and runs `update` against a fresh read.
    ///
    /// The lock covers both the read handed to `update` and the write of its
    /// result, and is released once the transaction commits or aborts.
    /// Fails with `NotFound` when the record does not exist.
    async fn transaction(&self, id: AccountId, update: AccountUpdate)
    -> Result<TransactionOutcome>;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;

#[async_trait]
pub trait LogEntryStore: Send + Sync {
    async fn append(&self, entry: LogEntry) -> Result<()>;
    async fn count(&self, severity: Option<Severity>) -> Result<u64>;
    /// Newest first, ties broken by descending id.
    async fn fetch(
        &self,
        severity: Option<Severity>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>>;
}

pub type LogEntryStoreBox = Box<dyn LogEntryStore>;
