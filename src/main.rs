use bonus_ledger::application::baseline::credit_unconditionally;
use bonus_ledger::application::bonus::{BonusGranter, GrantOutcome};
use bonus_ledger::application::log_query::{DEFAULT_PER_PAGE, LogQuery, LogQueryService};
use bonus_ledger::domain::account::{Account, AccountId, BonusAmount};
use bonus_ledger::domain::log_entry::Severity;
use bonus_ledger::domain::ports::{AccountStoreRef, LogEntryStoreBox};
use bonus_ledger::error::BonusError;
use bonus_ledger::infrastructure::in_memory::{InMemoryAccountStore, InMemoryLogEntryStore};
#[cfg(feature = "storage-rocksdb")]
use bonus_ledger::infrastructure::rocksdb::RocksDBStore;
use bonus_ledger::interfaces::csv::account_reader::AccountReader;
use bonus_ledger::interfaces::csv::account_writer::AccountWriter;
use bonus_ledger::interfaces::csv::log_entry_reader::LogEntryReader;
use bonus_ledger::telemetry;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Account used by the `demo` scenario.
const DEMO_ACCOUNT: AccountId = 1;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Credits awarded by the one-time bonus.
    #[arg(long, global = true, default_value_t = BonusAmount::DEFAULT.value())]
    amount: u64,

    /// Accounts CSV (id,balance,bonus_granted) loaded into the store first.
    #[arg(long, global = true)]
    accounts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grant the one-time bonus, firing the job as many times as requested
    Grant {
        account_id: AccountId,

        /// How many times the job is delivered.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        times: u64,

        /// Deliver all copies at once instead of one after another.
        #[arg(long)]
        concurrent: bool,
    },
    /// Fire the unconditional job and the idempotent job twice each
    ///
    /// Always runs on a scratch in-memory store.
    Demo,
    /// Print one page of log entries from a CSV file as JSON
    Logs {
        input: PathBuf,

        #[arg(long)]
        severity: Option<Severity>,

        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        #[arg(long, default_value_t = DEFAULT_PER_PAGE as i64, allow_negative_numbers = true)]
        per_page: i64,
    },
}

#[derive(Serialize)]
struct DemoRow {
    job: &'static str,
    balance: u64,
}

fn open_store(db_path: Option<PathBuf>) -> Result<AccountStoreRef> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Arc::new(InMemoryAccountStore::new()))
        }
        None => Ok(Arc::new(InMemoryAccountStore::new())),
    }
}

async fn seed_accounts(store: &AccountStoreRef, path: PathBuf) -> Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut loaded = 0usize;
    for account in AccountReader::new(file).accounts() {
        match account {
            Ok(account) => {
                let id = account.id;
                if store.insert(account).await.into_diagnostic()? {
                    loaded += 1;
                } else {
                    info!(account = id, "account already stored, keeping stored state");
                }
            }
            Err(e) => warn!(error = %e, "Error reading account, skipping"),
        }
    }
    info!(count = loaded, "accounts loaded");
    Ok(())
}

fn write_accounts(accounts: Vec<Account>) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()
}

async fn run_grant(
    granter: BonusGranter,
    account_id: AccountId,
    times: u64,
    concurrent: bool,
) -> Vec<std::result::Result<GrantOutcome, BonusError>> {
    if !concurrent {
        let mut results = Vec::new();
        for _ in 0..times {
            results.push(granter.grant_bonus(account_id).await);
        }
        return results;
    }

    let mut deliveries = JoinSet::new();
    for _ in 0..times {
        let granter = granter.clone();
        deliveries.spawn(async move { granter.grant_bonus(account_id).await });
    }

    let mut results = Vec::new();
    while let Some(joined) = deliveries.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => error!(error = %e, "delivery task panicked"),
        }
    }
    results
}

async fn run_demo(amount: BonusAmount) -> Result<()> {
    let store: AccountStoreRef = Arc::new(InMemoryAccountStore::new());
    store
        .store(Account::new(DEMO_ACCOUNT))
        .await
        .into_diagnostic()?;
    credit_unconditionally(store.as_ref(), DEMO_ACCOUNT, amount)
        .await
        .into_diagnostic()?;
    let unconditional = credit_unconditionally(store.as_ref(), DEMO_ACCOUNT, amount)
        .await
        .into_diagnostic()?;
    warn!(
        balance = unconditional.value(),
        expected = amount.value(),
        "unconditional job fired twice"
    );

    store
        .store(Account::new(DEMO_ACCOUNT))
        .await
        .into_diagnostic()?;
    let granter = BonusGranter::new(store.clone(), amount);
    granter.grant_bonus(DEMO_ACCOUNT).await.into_diagnostic()?;
    granter.grant_bonus(DEMO_ACCOUNT).await.into_diagnostic()?;
    let idempotent = store
        .get(DEMO_ACCOUNT)
        .await
        .into_diagnostic()?
        .ok_or(BonusError::NotFound(DEMO_ACCOUNT))
        .into_diagnostic()?
        .balance;
    info!(
        balance = idempotent.value(),
        expected = amount.value(),
        "idempotent job fired twice"
    );

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for row in [
        DemoRow {
            job: "unconditional",
            balance: unconditional.value(),
        },
        DemoRow {
            job: "idempotent",
            balance: idempotent.value(),
        },
    ] {
        writer.serialize(row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

async fn run_logs(input: PathBuf, query: LogQuery) -> Result<()> {
    let store: LogEntryStoreBox = Box::new(InMemoryLogEntryStore::new());
    let service = LogQueryService::new(store);

    let file = File::open(input).into_diagnostic()?;
    for entry in LogEntryReader::new(file).entries() {
        match entry {
            Ok(entry) => service.append(entry).await.into_diagnostic()?,
            Err(e) => warn!(error = %e, "Error reading log entry, skipping"),
        }
    }

    let page = service.page(&query).await.into_diagnostic()?;
    let json = serde_json::to_string_pretty(&page).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

async fn prepare_store(db_path: Option<PathBuf>, accounts: Option<PathBuf>) -> Result<AccountStoreRef> {
    let store = open_store(db_path)?;
    if let Some(path) = accounts {
        seed_accounts(&store, path).await?;
    }
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let Cli {
        db_path,
        amount,
        accounts,
        command,
    } = Cli::parse();
    let amount = BonusAmount::new(amount).into_diagnostic()?;

    match command {
        Command::Grant {
            account_id,
            times,
            concurrent,
        } => {
            let store = prepare_store(db_path, accounts).await?;
            let granter = BonusGranter::new(store.clone(), amount);
            let results = run_grant(granter, account_id, times, concurrent).await;

            let mut failure = None;
            for result in results {
                if let Err(e) = result {
                    error!(account = account_id, error = %e, "Error granting bonus");
                    failure.get_or_insert(e);
                }
            }

            write_accounts(store.get_all().await.into_diagnostic()?)?;
            if let Some(e) = failure {
                return Err(e).into_diagnostic();
            }
            Ok(())
        }
        Command::Demo => {
            if db_path.is_some() || accounts.is_some() {
                warn!("demo always runs on a scratch in-memory store; ignoring --db-path and --accounts");
            }
            run_demo(amount).await
        }
        Command::Logs {
            input,
            severity,
            page,
            per_page,
        } => {
            let query = LogQuery {
                severity,
                page,
                per_page,
            };
            run_logs(input, query).await
        }
    }
}
