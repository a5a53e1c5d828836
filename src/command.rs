use rust_decimal::{Decimal, prelude::Zero};
use serde::Deserialize;
use thiserror::Error;

use crate::account::{AccountId, Amount, MAX_SCALE};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Create,
    Get,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateAccountCommand {
    pub balance: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountQuery {
    pub id: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferCommand {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Amount,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("`{text}` is not a valid amount")]
    InvalidAmount { text: String },
    #[error("Amount must not have more than {max} decimal places, got `{text}`", max = MAX_SCALE)]
    TooPrecise { text: String },
    #[error("Transfer amount must be positive, got {amount}")]
    NonPositiveAmount { amount: Amount },
    #[error("`{text}` is not a valid account id")]
    InvalidId { text: String },
    #[error("Account {id} not found")]
    UnknownAccount { id: i64 },
    #[error("Cannot transfer from account {id} to itself")]
    SelfTransfer { id: AccountId },
}

/// Parses a plain decimal amount: an optional sign, digits and at most one
/// point. Anything finer than [`MAX_SCALE`] is rejected, never rounded.
pub fn parse_amount(text: &str) -> Result<Amount, CommandError> {
    let invalid = || CommandError::InvalidAmount {
        text: text.to_string(),
    };
    let trimmed = text.trim();
    let unsigned = trimmed
        .strip_prefix(|c: char| c == '-' || c == '+')
        .unwrap_or(trimmed);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction)
    {
        return Err(invalid());
    }
    if fraction.trim_end_matches('0').len() > MAX_SCALE as usize {
        return Err(CommandError::TooPrecise {
            text: text.to_string(),
        });
    }

    let amount = Decimal::from_str_exact(trimmed).map_err(|_| invalid())?;
    Ok(amount.normalize())
}

/// Checks the precision of an amount that did not come from text.
pub fn check_scale(amount: Amount) -> Result<(), CommandError> {
    if amount.normalize().scale() > MAX_SCALE {
        return Err(CommandError::TooPrecise {
            text: amount.to_string(),
        });
    }
    Ok(())
}

/// Parses an account id. A well-formed integer that no account can have
/// (negative, or past the id range) is an unknown account rather than bad
/// input.
pub fn parse_id(text: &str) -> Result<AccountId, CommandError> {
    let id = text
        .trim()
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidId {
            text: text.to_string(),
        })?;
    AccountId::try_from(id).map_err(|_| CommandError::UnknownAccount { id })
}

impl CreateAccountCommand {
    /// Sign is checked by [`Account::new`](crate::account::Account::new),
    /// which is the one place an account balance is validated.
    pub fn new(balance: Amount) -> Result<Self, CommandError> {
        check_scale(balance)?;
        Ok(Self { balance })
    }

    pub fn parse(balance: &str) -> Result<Self, CommandError> {
        Self::new(parse_amount(balance)?)
    }
}

impl AccountQuery {
    pub fn parse(id: &str) -> Result<Self, CommandError> {
        Ok(Self { id: parse_id(id)? })
    }
}

impl TransferCommand {
    /// Validates everything that does not depend on ledger state.
    /// Id bounds are checked by the ledger itself.
    pub fn new(from: AccountId, to: AccountId, amount: Amount) -> Result<Self, CommandError> {
        if amount <= Decimal::zero() {
            return Err(CommandError::NonPositiveAmount { amount });
        }
        check_scale(amount)?;
        if from == to {
            return Err(CommandError::SelfTransfer { id: from });
        }
        Ok(Self { from, to, amount })
    }

    pub fn parse(from: &str, to: &str, amount: &str) -> Result<Self, CommandError> {
        Self::new(parse_id(from)?, parse_id(to)?, parse_amount(amount)?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    #[test]
    fn parse_amounts() {
        assert_eq!(parse_amount("100").unwrap(), Decimal::from_u32(100).unwrap());
        assert_eq!(parse_amount(" 12.50 ").unwrap(), Decimal::new(125, 1));
        assert_eq!(parse_amount("0.0001").unwrap(), Decimal::new(1, 4));
        // trailing zeros do not count towards precision
        assert_eq!(parse_amount("1.500000").unwrap(), Decimal::new(15, 1));

        assert!(matches!(
            parse_amount("abc"),
            Err(CommandError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount(""),
            Err(CommandError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("0.00001"),
            Err(CommandError::TooPrecise { .. })
        ));
        assert_eq!(parse_amount("-7").unwrap(), Decimal::from_i32(-7).unwrap());
    }

    #[test]
    fn amounts_are_never_rounded() {
        for text in [
            "1.0000000000000000000000000000001",
            "0.00000000000000000000000000001",
            "0.00005",
        ] {
            assert!(
                matches!(parse_amount(text), Err(CommandError::TooPrecise { .. })),
                "{text} was accepted"
            );
        }
        for text in ["1_000", "1e3", "1.2.3", ".", "-", "1,5", "0x10"] {
            assert!(
                matches!(parse_amount(text), Err(CommandError::InvalidAmount { .. })),
                "{text} was accepted"
            );
        }
        // more integer digits than a decimal can hold
        assert!(matches!(
            parse_amount("100000000000000000000000000000000"),
            Err(CommandError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn create_command() {
        let cmd = CreateAccountCommand::parse("50").unwrap();
        assert_eq!(cmd.balance, Decimal::from_u32(50).unwrap());
        assert!(CreateAccountCommand::parse("0").is_ok());
        assert!(matches!(
            CreateAccountCommand::new(Decimal::new(1, 5)),
            Err(CommandError::TooPrecise { .. })
        ));
    }

    #[test]
    fn transfer_command() {
        let cmd = TransferCommand::parse("0", "1", "30").unwrap();
        assert_eq!(
            cmd,
            TransferCommand {
                from: 0,
                to: 1,
                amount: Decimal::from_u32(30).unwrap()
            }
        );

        assert_eq!(
            TransferCommand::parse("0", "0", "10").unwrap_err(),
            CommandError::SelfTransfer { id: 0 }
        );
        assert!(matches!(
            TransferCommand::parse("0", "1", "0").unwrap_err(),
            CommandError::NonPositiveAmount { .. }
        ));
        assert!(matches!(
            TransferCommand::parse("0", "1", "-5").unwrap_err(),
            CommandError::NonPositiveAmount { .. }
        ));
        assert!(matches!(
            TransferCommand::new(0, 1, Decimal::new(15, 5)).unwrap_err(),
            CommandError::TooPrecise { .. }
        ));
        assert_eq!(
            TransferCommand::parse("-1", "1", "5").unwrap_err(),
            CommandError::UnknownAccount { id: -1 }
        );
        assert!(matches!(
            TransferCommand::parse("one", "1", "5").unwrap_err(),
            CommandError::InvalidId { .. }
        ));
    }

    #[test]
    fn account_query() {
        assert_eq!(AccountQuery::parse("99").unwrap().id, 99);
        assert_eq!(AccountQuery::parse(" +3 ").unwrap().id, 3);
        assert!(matches!(
            AccountQuery::parse("x"),
            Err(CommandError::InvalidId { .. })
        ));
        assert_eq!(
            AccountQuery::parse("-1"),
            Err(CommandError::UnknownAccount { id: -1 })
        );
        assert_eq!(
            AccountQuery::parse("4294967296"),
            Err(CommandError::UnknownAccount { id: 4_294_967_296 })
        );
    }
}
