use std::sync::Arc;

use crate::{
    account::AccountSnapshot,
    command::{AccountQuery, CreateAccountCommand, RequestKind, TransferCommand},
    ledger::Ledger,
};

use super::{ProcessError, RequestFailure, RequestProcessor, Response, TransferResponse};

/// Processor over a ledger shared with other threads. The ledger is handed
/// in by the caller, so several processors (or tests) can point at the same
/// or at isolated instances.
#[derive(Debug, Clone, Default)]
pub struct SharedLedgerProcessor {
    ledger: Arc<Ledger>,
}

impl SharedLedgerProcessor {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn create(&self, balance: &str) -> Result<AccountSnapshot, ProcessError> {
        let command = CreateAccountCommand::parse(balance).inspect_err(|err| {
            tracing::error!(balance, error = %err, "create: bad balance");
        })?;
        let id = self.ledger.open_account(command.balance)?;
        let account = self.ledger.account(id)?;
        tracing::info!(id, balance = %command.balance, "account created");
        Ok(account.snapshot())
    }

    pub fn get(&self, id: &str) -> Result<AccountSnapshot, ProcessError> {
        let query = AccountQuery::parse(id).inspect_err(|err| {
            tracing::error!(id, error = %err, "get: bad account id");
        })?;
        let account = self.ledger.account(query.id).inspect_err(|err| {
            tracing::warn!(id = query.id, error = %err, "get: account lookup failed");
        })?;
        Ok(account.snapshot())
    }

    pub fn transfer(&self, from: &str, to: &str, amount: &str) -> Result<(), ProcessError> {
        let command = TransferCommand::parse(from, to, amount).inspect_err(|err| {
            tracing::error!(from, to, amount, error = %err, "transfer: bad arguments");
        })?;
        match self.ledger.execute(command) {
            Ok(()) => {
                tracing::info!(
                    from = command.from,
                    to = command.to,
                    amount = %command.amount,
                    "transfer completed"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    from = command.from,
                    to = command.to,
                    amount = %command.amount,
                    error = %err,
                    "transfer failed"
                );
                Err(err.into())
            }
        }
    }
}

impl RequestProcessor for SharedLedgerProcessor {
    fn process_request(
        &self,
        kind: RequestKind,
        id: &str,
        to: &str,
        amount: &str,
    ) -> Result<Response, RequestFailure> {
        match kind {
            RequestKind::Create => Ok(Response::Account(self.create(amount)?)),
            RequestKind::Get => Ok(Response::Account(self.get(id)?)),
            RequestKind::Transfer => {
                let result = self.transfer(id, to, amount);
                let response = Response::Transfer(TransferResponse::from(&result));
                match result {
                    Ok(()) => Ok(response),
                    Err(error) => Err(RequestFailure {
                        error,
                        response: Some(response),
                    }),
                }
            }
        }
    }
}
