//! Mchain command line: construct a ledger, run operation scripts against it
//! and inspect saved snapshots.
//!
//! Command output is JSON on stdout; logs go to stderr.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use mchain_ledger::{
    EventRecord, HolderAuthority, LedgerConfig, LedgerSnapshot, Operation, TokenLedger,
};
use mchain_types::{AccountId, TokenAmount};
use mchain_utils::LogFormat;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mchain", about = "Mchain token ledger")]
struct Cli {
    /// Path to a TOML ledger configuration file. Flags and env vars override
    /// the file.
    #[arg(long, env = "MCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Account credited with the initial supply (0x-prefixed hex).
    #[arg(long, env = "MCHAIN_CUSTODIAN_ADDRESS")]
    custodian: Option<AccountId>,

    /// Initial supply in whole tokens.
    #[arg(long, env = "MCHAIN_INITIAL_AMOUNT")]
    initial_amount: Option<u64>,

    /// Require batch senders to approve the ledger for the batch total.
    #[arg(long, env = "MCHAIN_BATCH_REQUIRES_APPROVAL")]
    batch_requires_approval: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "MCHAIN_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "MCHAIN_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Construct a ledger and print its metadata and supply.
    Genesis,
    /// Apply a JSON array of operations and print every outcome.
    Run {
        /// File holding the operation script.
        ops: PathBuf,
        /// Continue from this snapshot instead of a fresh genesis.
        #[arg(long)]
        from_snapshot: Option<PathBuf>,
        /// Write a snapshot of the final state here.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
        /// Stop at the first rejected operation and exit with an error.
        #[arg(long)]
        fail_fast: bool,
    },
    /// Verify, restore and audit a snapshot.
    Inspect {
        snapshot: PathBuf,
    },
}

impl Cli {
    /// File configuration (or defaults) with flag and env overrides applied.
    fn ledger_config(&self) -> anyhow::Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let config = LedgerConfig::from_toml_file(path)?;
                tracing::info!("loaded config from {}", path.display());
                config
            }
            None => LedgerConfig::default(),
        };
        if let Some(custodian) = self.custodian {
            config.custodian = Some(custodian);
        }
        if let Some(initial_amount) = self.initial_amount {
            config.initial_amount = initial_amount;
        }
        config.batch_requires_approval |= self.batch_requires_approval;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mchain_utils::init_logging(cli.log_format, &cli.log_level);

    let report = match &cli.command {
        Command::Genesis => {
            let ledger = TokenLedger::from_config(&cli.ledger_config()?)?;
            Report::summary(&ledger)
        }
        Command::Run {
            ops,
            from_snapshot,
            snapshot_out,
            fail_fast,
        } => {
            let config = cli.ledger_config()?;
            let ledger = match from_snapshot {
                Some(path) => {
                    TokenLedger::restore_in_memory(&read_snapshot(path)?, config.authorizer())?
                }
                None => TokenLedger::from_config(&config)?,
            };
            let report = run_script(&ledger, ops, *fail_fast)?;
            if let Some(path) = snapshot_out {
                write_snapshot(&ledger, path)?;
            }
            report
        }
        Command::Inspect { snapshot } => {
            let snapshot = read_snapshot(snapshot)?;
            let ledger = TokenLedger::restore_in_memory(&snapshot, Box::new(HolderAuthority))?;
            let audit = ledger.audit()?;
            Report {
                holders: Some(audit.holders),
                events: Some(ledger.events()),
                ..Report::summary(&ledger)
            }
        }
    };

    // Amounts can exceed u64, which serde_json::Value cannot hold.
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[derive(Debug, Serialize)]
struct BalanceLine {
    account: AccountId,
    balance: TokenAmount,
}

#[derive(Debug, Serialize)]
struct OperationOutcome {
    index: usize,
    operation: &'static str,
    ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<EventRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Command output.
#[derive(Debug, Serialize)]
struct Report {
    name: String,
    symbol: String,
    decimals: u8,
    ledger_id: AccountId,
    custodian: AccountId,
    total_supply: TokenAmount,
    total_supply_display: String,
    balances: Vec<BalanceLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    holders: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<OperationOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<EventRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<BTreeMap<&'static str, u64>>,
}

impl Report {
    fn summary(ledger: &TokenLedger) -> Self {
        let metadata = ledger.metadata();
        let total_supply = ledger.total_supply();
        Self {
            name: metadata.name.clone(),
            symbol: metadata.symbol.clone(),
            decimals: metadata.decimals,
            ledger_id: ledger.ledger_id(),
            custodian: ledger.custodian(),
            total_supply,
            total_supply_display: metadata.format_amount(total_supply),
            balances: ledger
                .accounts()
                .into_iter()
                .map(|(account, balance)| BalanceLine { account, balance })
                .collect(),
            holders: None,
            results: None,
            events: None,
            stats: None,
        }
    }
}

fn run_script(ledger: &TokenLedger, path: &Path, fail_fast: bool) -> anyhow::Result<Report> {
    let script = std::fs::read_to_string(path)
        .with_context(|| format!("reading operations from {}", path.display()))?;
    let operations = Operation::list_from_json(&script)
        .with_context(|| format!("parsing operations in {}", path.display()))?;
    tracing::info!(count = operations.len(), "running operation script");

    let mut results = Vec::with_capacity(operations.len());
    for (index, operation) in operations.iter().enumerate() {
        let outcome = match ledger.apply(operation) {
            Ok(events) => OperationOutcome {
                index,
                operation: operation.name(),
                ok: true,
                events,
                error: None,
            },
            Err(err) => {
                tracing::warn!(index, operation = operation.name(), error = %err, "operation rejected");
                if fail_fast {
                    bail!("operation {index} ({}) rejected: {err}", operation.name());
                }
                OperationOutcome {
                    index,
                    operation: operation.name(),
                    ok: false,
                    events: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };
        results.push(outcome);
    }

    ledger.audit()?;
    Ok(Report {
        results: Some(results),
        events: Some(ledger.events()),
        stats: Some(ledger.stats()),
        ..Report::summary(ledger)
    })
}

fn read_snapshot(path: &Path) -> anyhow::Result<LedgerSnapshot> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
    snapshot.verify()?;
    Ok(snapshot)
}

fn write_snapshot(ledger: &TokenLedger, path: &Path) -> anyhow::Result<()> {
    let snapshot = ledger.snapshot();
    std::fs::write(path, snapshot.to_bytes()?)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        accounts = snapshot.account_count(),
        events = snapshot.events.len(),
        "snapshot written"
    );
    Ok(())
}
