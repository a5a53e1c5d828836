use std::io::Write;

use crate::account::{AccountId, AccountSnapshot, Amount};
use anyhow::Context;
use csv::Writer;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct AccountRow {
    id: AccountId,
    balance: Amount,
}

/// Writes `id,balance` for every account, in the order given. Balances are
/// printed without trailing zeros.
pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl IntoIterator<Item = AccountSnapshot>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        let id = acc.id;
        writer
            .serialize(AccountRow {
                id,
                balance: acc.balance.normalize(),
            })
            .with_context(|| format!("Failed to write account {id} to CSV"))?;
    }
    writer.flush().context("Failed to flush CSV writer")
}
