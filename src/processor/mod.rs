use serde::Serialize;
use thiserror::Error;

use crate::{
    account::AccountSnapshot,
    command::{CommandError, RequestKind},
    ledger::LedgerError,
};

pub use crate::ledger::ErrorKind;

pub mod shared_ledger_processor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    LedgerErr(#[from] LedgerError),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::CommandErr(err) => LedgerError::from(err.clone()).kind(),
            ProcessError::LedgerErr(err) => err.kind(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransferStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferResponse {
    pub result: TransferStatus,
}

impl<E> From<&Result<(), E>> for TransferResponse {
    fn from(result: &Result<(), E>) -> Self {
        let result = match result {
            Ok(()) => TransferStatus::Ok,
            Err(_) => TransferStatus::Error,
        };
        Self { result }
    }
}

/// JSON shaped answer to a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Account(AccountSnapshot),
    Transfer(TransferResponse),
}

impl Response {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// A request that did not succeed. Failed transfers still answer with
/// `{"result":"Error"}`; failed creates and reads have nothing to show.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{error}")]
pub struct RequestFailure {
    pub error: ProcessError,
    pub response: Option<Response>,
}

impl From<ProcessError> for RequestFailure {
    fn from(error: ProcessError) -> Self {
        Self {
            error,
            response: None,
        }
    }
}

/// Integration point for whatever surface exposes the ledger (an HTTP layer,
/// a batch file). Parameters arrive as raw text, exactly as the caller sent
/// them.
pub trait RequestProcessor {
    fn process_request(
        &self,
        kind: RequestKind,
        id: &str,
        to: &str,
        amount: &str,
    ) -> Result<Response, RequestFailure>;
}
