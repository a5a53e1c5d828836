use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;

use crate::{
    account::{Account, AccountError, AccountId, AccountSnapshot, Amount, LockedBalance},
    command::{CommandError, CreateAccountCommand, TransferCommand},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },
    #[error("Invalid arguments: {reason}")]
    InvalidArguments { reason: String },
    #[error("Account {id} not found")]
    NotFound { id: i64 },
    #[error("Insufficient funds in account {id}: {available} available, {requested} requested")]
    InsufficientFunds {
        id: AccountId,
        available: Amount,
        requested: Amount,
    },
}

/// The four failure kinds a caller can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    InvalidArguments,
    NotFound,
    InsufficientFunds,
}

impl LedgerError {
    pub fn not_found(id: AccountId) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            LedgerError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

impl From<CommandError> for LedgerError {
    fn from(err: CommandError) -> Self {
        let reason = err.to_string();
        match err {
            CommandError::InvalidAmount { .. } | CommandError::TooPrecise { .. } => {
                Self::InvalidAmount { reason }
            }
            CommandError::UnknownAccount { id } => Self::NotFound { id },
            CommandError::NonPositiveAmount { .. }
            | CommandError::InvalidId { .. }
            | CommandError::SelfTransfer { .. } => Self::InvalidArguments { reason },
        }
    }
}

/// Append-only registry of accounts and owner of the transfer algorithm.
///
/// Accounts are stored as independently allocated `Arc`s, so growing the
/// registry never moves an account another thread is holding. The registry
/// lock only guards growth and id lookup; it is never held while an account
/// lock is taken.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: RwLock<Vec<Arc<Account>>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `balance` and opens an account with it.
    pub fn create_account(&self, balance: &str) -> Result<AccountId, LedgerError> {
        let command = CreateAccountCommand::parse(balance)?;
        self.open_account(command.balance)
    }

    pub fn open_account(&self, balance: Amount) -> Result<AccountId, LedgerError> {
        let command = CreateAccountCommand::new(balance)?;

        let mut accounts = self.accounts.write();
        let id = AccountId::try_from(accounts.len()).map_err(|_| {
            LedgerError::InvalidArguments {
                reason: "no account ids left".to_string(),
            }
        })?;
        // rejects negative balances; nothing is pushed, so no id is used up
        let account = Account::new(id, command.balance, Utc::now()).map_err(|err| {
            LedgerError::InvalidAmount {
                reason: err.to_string(),
            }
        })?;
        // fully built before it becomes reachable
        accounts.push(Arc::new(account));
        Ok(id)
    }

    pub fn account(&self, id: AccountId) -> Result<Arc<Account>, LedgerError> {
        self.accounts
            .read()
            .get(id as usize)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(id))
    }

    pub fn balance(&self, id: AccountId) -> Result<Amount, LedgerError> {
        Ok(self.account(id)?.balance())
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every account in id order. Each balance is read under its own lock,
    /// so with transfers in flight this is not one atomic cut.
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        let accounts: Vec<Arc<Account>> = self.accounts.read().clone();
        accounts.iter().map(|acc| acc.snapshot()).collect()
    }

    /// Sum of all balances; exact only while no transfer is running.
    pub fn total_balance(&self) -> Amount {
        self.snapshot().iter().map(|acc| acc.balance).sum()
    }

    /// Moves `amount` from one account to another, all or nothing.
    ///
    /// Both account locks are taken in ascending id order whatever the
    /// direction of the transfer, so two opposite transfers between the same
    /// pair can never wait on each other.
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let TransferCommand { from, to, amount } = TransferCommand::new(from, to, amount)?;

        let (source, target) = {
            let accounts = self.accounts.read();
            let lookup = |id: AccountId| {
                accounts
                    .get(id as usize)
                    .cloned()
                    .ok_or_else(|| LedgerError::not_found(id))
            };
            (lookup(from)?, lookup(to)?)
        };

        let (lower, higher) = if from < to {
            (&source, &target)
        } else {
            (&target, &source)
        };
        let mut lower_balance = lower.lock();
        let mut higher_balance = higher.lock();

        let (source_balance, target_balance) = if from < to {
            (&mut lower_balance, &mut higher_balance)
        } else {
            (&mut higher_balance, &mut lower_balance)
        };
        let result = move_funds(source_balance, target_balance, amount);

        drop(higher_balance);
        drop(lower_balance);

        result.map_err(|err| match err {
            AccountError::InsufficientFunds {
                available,
                requested,
            } => LedgerError::InsufficientFunds {
                id: from,
                available,
                requested,
            },
            err => LedgerError::InvalidArguments {
                reason: err.to_string(),
            },
        })
    }

    pub fn execute(&self, command: TransferCommand) -> Result<(), LedgerError> {
        self.transfer(command.from, command.to, command.amount)
    }
}

fn move_funds(
    source: &mut LockedBalance<'_>,
    target: &mut LockedBalance<'_>,
    amount: Amount,
) -> Result<(), AccountError> {
    // nothing is touched unless both sides are known to succeed
    if !target.can_credit(amount) {
        return Err(AccountError::Overflow { amount });
    }
    source.debit(amount)?;
    target.credit(amount)
}
