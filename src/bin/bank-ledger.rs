use std::{fs::File, num::NonZeroUsize, sync::Arc, thread};

use anyhow::{Context, Result};
use bank_ledger::{bin_utils::Service, ledger::Ledger, processor::ProcessError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let filename = args
        .next()
        .context("Expected a file name as the first argument")?;
    let workers = match args.next() {
        Some(workers) => workers
            .parse::<NonZeroUsize>()
            .with_context(|| format!("`{workers}` is not a valid worker count"))?,
        None => thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
    };
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        ledger: Arc::new(Ledger::new()),
        workers,
        error_printer: Box::new(|line: u64, err: ProcessError| {
            match err {
                ProcessError::CommandErr(err) => eprintln!("Error at line {line}: {err}"),
                ProcessError::LedgerErr(_) => {
                    // refused transfers and unknown ids are already logged by the processor
                }
            }
        }),
    };
    service.run()
}
