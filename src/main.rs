use clap::Parser;
use finledger::application::limits::LimitEnforcer;
use finledger::application::processor::TransactionProcessor;
use finledger::config::LimitsConfig;
use finledger::domain::ports::{
    AccountStore, AccountStoreBox, DailyLimitStore, LedgerStore, UnitOfWork,
};
use finledger::infrastructure::in_memory::{InMemoryBackend, InMemoryOwnershipValidator};
use finledger::interfaces::csv::account_reader::{AccountReader, AccountRow};
use finledger::interfaces::csv::account_writer::AccountWriter;
use finledger::interfaces::csv::operation_reader::{OperationReader, OperationRow, OperationType};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV of accounts to seed: account,owner,balance[,status]
    accounts: PathBuf,

    /// CSV of operations to replay: type,user,account,counterparty,amount[,description,reference]
    operations: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let accounts_file = File::open(&cli.accounts).into_diagnostic()?;
    let rows: Vec<AccountRow> = AccountReader::new(accounts_file)
        .accounts()
        .collect::<finledger::error::Result<_>>()
        .into_diagnostic()?;

    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &cli.db_path {
        let backend =
            finledger::infrastructure::rocksdb::RocksDbBackend::open(db_path).into_diagnostic()?;
        return run(backend, rows, &cli.operations).await;
    }

    run(InMemoryBackend::new(), rows, &cli.operations).await
}

async fn run<B>(backend: B, rows: Vec<AccountRow>, operations: &PathBuf) -> Result<()>
where
    B: AccountStore + LedgerStore + DailyLimitStore + UnitOfWork + Clone + 'static,
{
    let ownership =
        InMemoryOwnershipValidator::new(rows.iter().map(|r| (r.account.clone(), r.owner)));
    for row in rows {
        AccountStore::save(&backend, row.into_account())
            .await
            .into_diagnostic()?;
    }

    let report_store: AccountStoreBox = Box::new(backend.clone());
    let processor = TransactionProcessor::new(
        Box::new(backend.clone()),
        Box::new(backend.clone()),
        Box::new(ownership),
        LimitEnforcer::new(Box::new(backend.clone()), LimitsConfig::default()),
        Box::new(backend),
    );

    let file = File::open(operations).into_diagnostic()?;
    for row in OperationReader::new(file).operations() {
        match row {
            Ok(op) => {
                if let Err(e) = apply(&processor, op).await {
                    eprintln!("Error processing operation: {e}");
                }
            }
            Err(e) => eprintln!("Error reading operation: {e}"),
        }
    }

    let accounts = report_store.find_all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}

async fn apply(
    processor: &TransactionProcessor,
    op: OperationRow,
) -> finledger::error::Result<()> {
    let description = op.description.unwrap_or_default();
    match op.r#type {
        OperationType::Deposit => {
            processor
                .deposit(&op.account, op.user, op.amount, &description, op.reference)
                .await?;
        }
        OperationType::Withdraw => {
            processor
                .withdraw(&op.account, op.user, op.amount, &description, op.reference)
                .await?;
        }
        OperationType::Transfer => {
            let destination = op.counterparty.ok_or_else(|| {
                finledger::error::LedgerError::internal(io::Error::other(
                    "transfer row is missing a counterparty account",
                ))
            })?;
            processor
                .transfer(
                    &op.account,
                    &destination,
                    op.user,
                    op.amount,
                    &description,
                    op.reference,
                )
                .await?;
        }
    }
    Ok(())
}
