#![allow(dead_code)]

use async_trait::async_trait;
use bonus_ledger::domain::account::{Account, AccountId};
use bonus_ledger::domain::ports::{AccountStore, AccountUpdate, TransactionOutcome};
use bonus_ledger::error::{BonusError, Result};
use bonus_ledger::infrastructure::in_memory::InMemoryAccountStore;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;

pub async fn seeded_store(accounts: Vec<Account>) -> Arc<InMemoryAccountStore> {
    let store = Arc::new(InMemoryAccountStore::new());
    for account in accounts {
        store.store(account).await.unwrap();
    }
    store
}

/// Wraps a store and fails every commit while `down` is set.
///
/// The update still runs against a working copy, so the test observes a
/// transaction that got as far as the commit and then lost the store.
pub struct FlakyStore {
    inner: InMemoryAccountStore,
    down: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: InMemoryAccountStore) -> Self {
        Self {
            inner,
            down: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.down.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountStore for FlakyStore {
    async fn store(&self, account: Account) -> Result<()> {
        self.inner.store(account).await
    }

    async fn insert(&self, account: Account) -> Result<bool> {
        self.inner.insert(account).await
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        self.inner.get_all().await
    }

    async fn transaction(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<TransactionOutcome> {
        if !self.down.load(Ordering::SeqCst) {
            return self.inner.transaction(id, update).await;
        }

        let mut draft = self.inner.get(id).await?.ok_or(BonusError::NotFound(id))?;
        update(&mut draft)?;
        Err(BonusError::StoreUnavailable(
            "connection reset during commit".to_string(),
        ))
    }
}

pub fn accounts_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,balance,bonus_granted").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}
