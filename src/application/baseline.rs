//! The unsafe way to award a bonus, kept to show what goes wrong.
//!
//! `credit_unconditionally` reads the account, adds the amount, and writes it
//! back with no flag check and no lock. A retried or duplicated job credits
//! the account again. Nothing outside the `demo` command and the tests calls
//! it; use [`BonusGranter`](super::bonus::BonusGranter) instead.

use crate::domain::account::{AccountId, BonusAmount, Credits};
use crate::domain::ports::AccountStore;
use crate::error::{BonusError, Result};
use tracing::warn;

/// Credits `amount` to the account every time it is called.
pub async fn credit_unconditionally(
    store: &dyn AccountStore,
    account_id: AccountId,
    amount: BonusAmount,
) -> Result<Credits> {
    let mut account = store
        .get(account_id)
        .await?
        .ok_or(BonusError::NotFound(account_id))?;

    account.credit(amount)?;
    let balance = account.balance;
    store.store(account).await?;

    warn!(
        account = account_id,
        balance = balance.value(),
        "credited without idempotency check"
    );
    Ok(balance)
}
