use crate::domain::account::{Account, AccountId, BonusAmount, Credits};
use crate::domain::ports::AccountStoreRef;
use crate::error::Result;
use tracing::{info, warn};

/// What a call to [`BonusGranter::grant_bonus`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// This call applied the bonus; `balance` is the committed value.
    Granted { balance: Credits },
    /// An earlier call already applied the bonus. Nothing was written.
    AlreadyGranted,
}

/// Awards a one-time bonus so that retries and duplicate deliveries are harmless.
///
/// The check of `bonus_granted` and the credit happen in the same store
/// transaction, under the store's per-account lock. Calling `grant_bonus` once
/// or a hundred times, sequentially or concurrently, leaves the account in
/// the same state.
///
/// Cloning is cheap and clones share the store.
#[derive(Clone)]
pub struct BonusGranter {
    store: AccountStoreRef,
    amount: BonusAmount,
}

impl BonusGranter {
    /// Creates a new `BonusGranter`.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding the accounts.
    /// * `amount` - The bonus credited on the first successful grant.
    pub fn new(store: AccountStoreRef, amount: BonusAmount) -> Self {
        Self { store, amount }
    }

    pub fn amount(&self) -> BonusAmount {
        self.amount
    }

    /// Grants the bonus to `account_id` unless it has already been granted.
    ///
    /// Fails with `NotFound` for an unknown account and `StoreUnavailable`
    /// when the store cannot commit; in both cases nothing is written, and
    /// the latter is safe to retry.
    pub async fn grant_bonus(&self, account_id: AccountId) -> Result<GrantOutcome> {
        let amount = self.amount;
        let update = Box::new(move |account: &mut Account| account.grant_bonus(amount));
        let result = self.store.transaction(account_id, update).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(account = account_id, error = %e, "bonus grant failed");
                return Err(e);
            }
        };

        if outcome.committed {
            info!(
                account = account_id,
                balance = outcome.account.balance.value(),
                "bonus granted"
            );
            Ok(GrantOutcome::Granted {
                balance: outcome.account.balance,
            })
        } else {
            info!(account = account_id, "bonus already granted, skipping");
            Ok(GrantOutcome::AlreadyGranted)
        }
    }
}
