use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::{Decimal, prelude::Zero};
use serde::Serialize;
use thiserror::Error;

pub type AccountId = u32;

/// Monetary amount in decimal fixed-point, never a binary float.
pub type Amount = Decimal;

/// Maximum number of fractional digits accepted for an [`Amount`].
pub const MAX_SCALE: u32 = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Balance must not be negative, got {balance}")]
    NegativeBalance { balance: Amount },
    #[error("Insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds { available: Amount, requested: Amount },
    #[error("Crediting {amount} would overflow the balance")]
    Overflow { amount: Amount },
}

/// A single monetary account.
///
/// `id` and `created_at` never change after construction, so only the
/// balance sits behind the account's own lock.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    created_at: DateTime<Utc>,
    balance: Mutex<Amount>,
}

/// Point in time view of an account, as handed out to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: Amount,
    pub created: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: AccountId,
        balance: Amount,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AccountError> {
        if balance < Decimal::zero() {
            return Err(AccountError::NegativeBalance { balance });
        }
        Ok(Self {
            id,
            created_at,
            balance: Mutex::new(balance),
        })
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn balance(&self) -> Amount {
        *self.balance.lock()
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            balance: self.balance(),
            created: self.created_at,
        }
    }

    /// Takes the account lock. Only the ledger mutates balances, and it
    /// must follow its lock ordering when holding more than one of these.
    pub(crate) fn lock(&self) -> LockedBalance<'_> {
        LockedBalance {
            guard: self.balance.lock(),
        }
    }
}

/// Balance of an account whose lock is currently held.
pub(crate) struct LockedBalance<'a> {
    guard: MutexGuard<'a, Amount>,
}

impl LockedBalance<'_> {
    /// Checks the funds and subtracts in the same critical section.
    pub fn debit(&mut self, amount: Amount) -> Result<(), AccountError> {
        if *self.guard < amount {
            return Err(AccountError::InsufficientFunds {
                available: *self.guard,
                requested: amount,
            });
        }
        *self.guard -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: Amount) -> Result<(), AccountError> {
        *self.guard = self
            .guard
            .checked_add(amount)
            .ok_or(AccountError::Overflow { amount })?;
        Ok(())
    }

    /// Returns whether `amount` could be credited without overflowing.
    pub fn can_credit(&self, amount: Amount) -> bool {
        self.guard.checked_add(amount).is_some()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    fn dec(value: u32) -> Amount {
        Decimal::from_u32(value).unwrap()
    }

    #[test]
    fn new_account_rejects_negative_balance() {
        let err = Account::new(0, Decimal::from_i32(-1).unwrap(), Utc::now()).unwrap_err();
        assert!(matches!(err, AccountError::NegativeBalance { .. }));
        assert_eq!(err.to_string(), "Balance must not be negative, got -1");

        let acc = Account::new(3, Decimal::zero(), Utc::now()).unwrap();
        assert_eq!(acc.id(), 3);
        assert_eq!(acc.balance(), Decimal::zero());
    }

    #[test]
    fn debit_and_credit() {
        let acc = Account::new(0, dec(10), Utc::now()).unwrap();
        acc.lock().debit(dec(4)).unwrap();
        assert_eq!(acc.balance(), dec(6));
        acc.lock().credit(dec(1)).unwrap();
        assert_eq!(acc.balance(), dec(7));
    }

    #[test]
    fn debit_never_overdraws() {
        let acc = Account::new(0, dec(5), Utc::now()).unwrap();
        let err = acc.lock().debit(dec(6)).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                available: dec(5),
                requested: dec(6)
            }
        );
        assert_eq!(acc.balance(), dec(5));

        // draining to exactly zero is fine
        acc.lock().debit(dec(5)).unwrap();
        assert_eq!(acc.balance(), Decimal::zero());
    }

    #[test]
    fn credit_overflow_leaves_balance() {
        let acc = Account::new(0, Decimal::MAX, Utc::now()).unwrap();
        let mut locked = acc.lock();
        assert!(!locked.can_credit(dec(1)));
        let err = locked.credit(dec(1)).unwrap_err();
        assert!(matches!(err, AccountError::Overflow { .. }));
        drop(locked);
        assert_eq!(acc.balance(), Decimal::MAX);
    }

    #[test]
    fn snapshot_serializes() {
        let created = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let acc = Account::new(7, Decimal::new(1050, 2), created).unwrap();
        let json = serde_json::to_string(&acc.snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"balance":"10.50","created":"2024-01-02T03:04:05Z"}"#
        );
    }
}
