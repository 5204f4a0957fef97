use crate::error::{BonusError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type AccountId = u64;

/// A non-negative count of credits held by an account.
///
/// Wraps `u64` so balances cannot go negative and additions are checked
/// instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credits(pub u64);

impl Credits {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, amount: BonusAmount) -> Option<Self> {
        self.0.checked_add(amount.value()).map(Self)
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed amount credited by a one-time bonus. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusAmount(u64);

impl BonusAmount {
    pub const DEFAULT: Self = Self(10);

    pub fn new(value: u64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(BonusError::ValidationError(
                "Bonus amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for BonusAmount {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for BonusAmount {
    type Error = BonusError;

    fn try_from(value: u64) -> Result<Self> {
        Self::new(value)
    }
}

/// An account eligible for a one-time bonus.
///
/// `bonus_granted` only ever moves from `false` to `true`, and it does so in
/// the same write that adds the bonus to `balance`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Account {
    pub id: AccountId,
    pub balance: Credits,
    pub bonus_granted: bool,
}

impl Account {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: Credits::ZERO,
            bonus_granted: false,
        }
    }

    pub fn with_balance(id: AccountId, balance: Credits) -> Self {
        Self {
            balance,
            ..Self::new(id)
        }
    }

    /// Applies the bonus unless it was already applied.
    ///
    /// Returns `Ok(true)` when the account changed and `Ok(false)` when the
    /// bonus had already been granted. On overflow the account is untouched.
    pub fn grant_bonus(&mut self, amount: BonusAmount) -> Result<bool> {
        if self.bonus_granted {
            return Ok(false);
        }
        self.balance = self.credited(amount)?;
        self.bonus_granted = true;
        Ok(true)
    }

    /// Adds credits without looking at `bonus_granted`.
    pub fn credit(&mut self, amount: BonusAmount) -> Result<()> {
        self.balance = self.credited(amount)?;
        Ok(())
    }

    fn credited(&self, amount: BonusAmount) -> Result<Credits> {
        self.balance.checked_add(amount).ok_or_else(|| {
            BonusError::ValidationError(format!("Balance overflow on account {}", self.id))
        })
    }
}
