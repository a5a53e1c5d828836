//! Batch driver that replays a CSV file of requests against one shared
//! [`Ledger`](crate::ledger::Ledger) from several threads.

use std::{
    io::{Read, Write},
    num::NonZeroUsize,
    sync::Arc,
    thread,
};

use crate::{
    command::RequestKind,
    ledger::Ledger,
    processor::{ProcessError, RequestProcessor, shared_ledger_processor::SharedLedgerProcessor},
};
use anyhow::{Context, Result};
use csv_parser::{CsvRequestParser, Request};
use csv_printer::print_accounts;
pub mod csv_parser;
pub mod csv_printer;

pub type ErrorPrinter = Box<dyn Fn(u64, ProcessError) + Send + Sync>;

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub ledger: Arc<Ledger>,
    pub workers: NonZeroUsize,
    pub error_printer: ErrorPrinter,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    /// Runs every `create` row first, in file order, so ids follow the order
    /// of appearance. The remaining rows are dealt round-robin to the workers.
    pub fn run(self) -> Result<()> {
        let Service {
            input,
            output,
            ledger,
            workers,
            error_printer,
        } = self;
        let processor = SharedLedgerProcessor::new(Arc::clone(&ledger));

        let mut pending = Vec::new();
        let parser = CsvRequestParser::new(input).context("Failed to read CSV header")?;
        for (line, row) in parser {
            let row = row.with_context(|| format!("Malformed request at line {line}"))?;
            match row.kind {
                RequestKind::Create => dispatch(&processor, &error_printer, line, &row),
                RequestKind::Get | RequestKind::Transfer => pending.push((line, row)),
            }
        }
        tracing::info!(
            accounts = ledger.len(),
            requests = pending.len(),
            workers = workers.get(),
            "accounts created, replaying requests"
        );

        let workers = workers.get();
        thread::scope(|s| {
            for worker in 0..workers {
                let (pending, processor, error_printer) = (&pending, &processor, &error_printer);
                s.spawn(move || {
                    for (line, row) in pending.iter().skip(worker).step_by(workers) {
                        dispatch(processor, error_printer, *line, row);
                    }
                });
            }
        });

        print_accounts(output, ledger.snapshot())
    }
}

fn dispatch(
    processor: &impl RequestProcessor,
    error_printer: &ErrorPrinter,
    line: u64,
    row: &Request,
) {
    if let Err(failure) = processor.process_request(row.kind, row.id(), row.to(), row.amount()) {
        error_printer(line, failure.error);
    }
}
