use crate::domain::account::{Account, AccountId};
use crate::domain::log_entry::{LogEntry, Severity};
use crate::domain::ports::{AccountStore, AccountUpdate, LogEntryStore, TransactionOutcome};
use crate::error::{BonusError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type Record = Arc<Mutex<Account>>;

/// A thread-safe in-memory store for accounts.
///
/// Every record sits behind its own `Mutex`, which plays the part of a row
/// lock: transactions on one account queue up behind each other while other
/// accounts stay untouched. The outer `RwLock` only guards the id index and
/// is never held while a record lock is awaited.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<BTreeMap<AccountId, Record>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn record(&self, id: AccountId) -> Option<Record> {
        let accounts = self.accounts.read().await;
        accounts.get(&id).cloned()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn store(&self, account: Account) -> Result<()> {
        let record = {
            let mut accounts = self.accounts.write().await;
            accounts
                .entry(account.id)
                .or_insert_with(|| Arc::new(Mutex::new(account.clone())))
                .clone()
        };
        *record.lock().await = account;
        Ok(())
    }

    async fn insert(&self, account: Account) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        match accounts.entry(account.id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(account)));
                Ok(true)
            }
        }
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        match self.record(id).await {
            Some(record) => Ok(Some(record.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        let records: Vec<Record> = {
            let accounts = self.accounts.read().await;
            accounts.values().cloned().collect()
        };

        let mut all = Vec::with_capacity(records.len());
        for record in records {
            all.push(record.lock().await.clone());
        }
        Ok(all)
    }

    async fn transaction(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<TransactionOutcome> {
        let record = self.record(id).await.ok_or(BonusError::NotFound(id))?;
        let mut locked = record.lock().await;
        debug!(account = id, "record locked for update");

        let mut draft = locked.clone();
        let committed = update(&mut draft)?;
        if committed {
            *locked = draft;
        }

        Ok(TransactionOutcome {
            account: locked.clone(),
            committed,
        })
    }
}

/// In-memory log entries, kept sorted newest first.
#[derive(Default, Clone)]
pub struct InMemoryLogEntryStore {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl InMemoryLogEntryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_severity(entry: &LogEntry, severity: Option<Severity>) -> bool {
    severity.is_none_or(|s| entry.severity == s)
}

#[async_trait]
impl LogEntryStore for InMemoryLogEntryStore {
    async fn append(&self, entry: LogEntry) -> Result<()> {
        let mut entries = self.entries.write().await;
        let key = (entry.timestamp, entry.id);
        let pos = entries.partition_point(|e| (e.timestamp, e.id) > key);
        entries.insert(pos, entry);
        Ok(())
    }

    async fn count(&self, severity: Option<Severity>) -> Result<u64> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| has_severity(e, severity)).count() as u64)
    }

    async fn fetch(
        &self,
        severity: Option<Severity>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| has_severity(e, severity))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
