use bonus_ledger::application::bonus::{BonusGranter, GrantOutcome};
use bonus_ledger::domain::account::{Account, BonusAmount, Credits};
use bonus_ledger::domain::ports::AccountStore;
use bonus_ledger::error::BonusError;
use bonus_ledger::infrastructure::in_memory::InMemoryAccountStore;
use common::FlakyStore;
use std::sync::Arc;

mod common;

async fn flaky_store_with(account: Account) -> Arc<FlakyStore> {
    let inner = InMemoryAccountStore::new();
    inner.store(account).await.unwrap();
    Arc::new(FlakyStore::new(inner))
}

#[tokio::test]
async fn test_failed_commit_leaves_no_partial_state() {
    let store = flaky_store_with(Account::new(1)).await;
    let granter = BonusGranter::new(store.clone(), BonusAmount::DEFAULT);

    let err = granter.grant_bonus(1).await.unwrap_err();

    assert!(matches!(err, BonusError::StoreUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(store.get(1).await.unwrap().unwrap(), Account::new(1));
}

#[tokio::test]
async fn test_retry_after_recovery_grants_exactly_once() {
    let store = flaky_store_with(Account::new(1)).await;
    let granter = BonusGranter::new(store.clone(), BonusAmount::DEFAULT);

    for _ in 0..3 {
        assert!(granter.grant_bonus(1).await.is_err());
    }
    store.recover();

    assert_eq!(
        granter.grant_bonus(1).await.unwrap(),
        GrantOutcome::Granted {
            balance: Credits(10)
        }
    );
    assert_eq!(
        granter.grant_bonus(1).await.unwrap(),
        GrantOutcome::AlreadyGranted
    );
    assert_eq!(store.get(1).await.unwrap().unwrap().balance, Credits(10));
}

#[tokio::test]
async fn test_missing_account_is_reported_before_store_failure() {
    let store = flaky_store_with(Account::new(1)).await;
    let granter = BonusGranter::new(store, BonusAmount::DEFAULT);

    assert!(matches!(
        granter.grant_bonus(99).await,
        Err(BonusError::NotFound(99))
    ));
}
