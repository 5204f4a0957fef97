use crate::domain::account::{Account, AccountId};
use crate::domain::ports::{AccountStore, AccountUpdate, TransactionOutcome};
use crate::error::{BonusError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, TransactionDB,
    TransactionDBOptions,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Column Family for storing account states.
pub const CF_ACCOUNTS: &str = "accounts";

/// Default time a transaction waits for a row lock before giving up.
pub const LOCK_TIMEOUT_MS: i64 = 5_000;

/// A persistent account store backed by a RocksDB `TransactionDB`.
///
/// `transaction` takes a pessimistic row lock with `get_for_update`, so two
/// processes sharing the database cannot both observe `bonus_granted ==
/// false` for the same account. Keys are big-endian ids, which keeps
/// iteration ordered by id.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_lock_timeout(path, LOCK_TIMEOUT_MS)
    }

    /// Like [`RocksDBStore::open`], waiting at most `lock_timeout_ms` for a
    /// row lock. A transaction that times out fails with `StoreUnavailable`.
    pub fn open_with_lock_timeout<P: AsRef<Path>>(path: P, lock_timeout_ms: i64) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut txn_opts = TransactionDBOptions::default();
        txn_opts.set_txn_lock_timeout(lock_timeout_ms);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let db: TransactionDB =
            TransactionDB::open_cf_descriptors(&opts, &txn_opts, path, vec![cf_accounts])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn accounts_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_ACCOUNTS).ok_or_else(|| {
            BonusError::StoreUnavailable("Accounts column family not found".to_string())
        })
    }

    fn run_transaction(&self, id: AccountId, update: AccountUpdate) -> Result<TransactionOutcome> {
        let cf = self.accounts_cf()?;
        let txn = self.db.transaction();

        let bytes = txn
            .get_for_update_cf(cf, id.to_be_bytes(), true)?
            .ok_or(BonusError::NotFound(id))?;
        let current: Account = serde_json::from_slice(&bytes)?;
        debug!(account = id, "row locked for update");

        let mut draft = current.clone();
        let committed = match update(&mut draft) {
            Ok(committed) => committed,
            Err(e) => {
                // Dropping the transaction rolls it back too; keep the update's error.
                let _ = txn.rollback();
                return Err(e);
            }
        };

        if !committed {
            txn.rollback()?;
            return Ok(TransactionOutcome {
                account: current,
                committed,
            });
        }

        txn.put_cf(cf, id.to_be_bytes(), serde_json::to_vec(&draft)?)?;
        txn.commit()?;

        Ok(TransactionOutcome {
            account: draft,
            committed,
        })
    }
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn store(&self, account: Account) -> Result<()> {
        let cf = self.accounts_cf()?;
        let value = serde_json::to_vec(&account)?;
        self.db.put_cf(cf, account.id.to_be_bytes(), value)?;
        Ok(())
    }

    async fn insert(&self, account: Account) -> Result<bool> {
        let cf = self.accounts_cf()?;
        let txn = self.db.transaction();
        let key = account.id.to_be_bytes();

        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            let _ = txn.rollback();
            return Ok(false);
        }
        txn.put_cf(cf, key, serde_json::to_vec(&account)?)?;
        txn.commit()?;
        Ok(true)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>> {
        let cf = self.accounts_cf()?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        let cf = self.accounts_cf()?;

        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(serde_json::from_slice(&value)?);
        }
        Ok(accounts)
    }

    /// Waits for the row lock synchronously, blocking the calling worker
    /// thread for up to the configured lock timeout.
    async fn transaction(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<TransactionOutcome> {
        self.run_transaction(id, update)
    }
}
