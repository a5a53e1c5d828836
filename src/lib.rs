/// Accounts and their balances. Each account carries its own lock, which
/// guards the balance only.
pub mod account;

/// Parsing of textual request parameters into validated commands.
pub mod command;

/// The ledger: an append-only account registry plus the transfer algorithm.
/// Never logs, every failure is returned to the caller.
pub mod ledger;

/// Request processor interface, plus an implementation over a shared ledger.
/// Maps raw request text to ledger calls and back to JSON shaped responses,
/// and is where outcomes get logged.
pub mod processor;

/// Batch driver used by the binary and the integration tests.
pub mod bin_utils;
