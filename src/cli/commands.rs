//! CLI command implementations
//!
//! Every command loads the config first. All but `init` refuse to run
//! against a data directory that was never initialized.

use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::config::Config;
use crate::core::{Ledger, QueryMode, Tx};
use crate::errors::{LedgerError, LedgerResult};
use crate::model::{RecordId, UnixTime};
use crate::observability::{log_event, Event};
use crate::storage::{journal_path, Journal};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_lines, write_line, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Submit { config, check_only } => {
            let stdin = io::stdin();
            submit(&config, check_only, stdin.lock(), &mut io::stdout())
        }
        Command::Tick { config, now } => tick(&config, &now),
        Command::Query {
            config,
            path,
            data,
            id,
            prefix,
        } => query(&config, &path, data.as_deref(), id, prefix),
    }
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    let path = config_path.display().to_string();
    log_event(Event::ConfigLoaded, &[("path", &path)]);
    Ok(config)
}

fn is_initialized(config: &Config) -> bool {
    journal_path(&config.data_dir).exists()
}

fn open_ledger(config_path: &Path) -> CliResult<Ledger> {
    let config = load_config(config_path)?;
    if !is_initialized(&config) {
        return Err(CliError::NotInitialized);
    }
    Ok(Ledger::open(&config)?)
}

/// Create the data directory and an empty journal
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    if is_initialized(&config) {
        return Err(CliError::AlreadyInitialized);
    }

    let journal = Journal::open(&config.data_dir, config.journal_fsync).map_err(LedgerError::from)?;
    write_response(json!({
        "initialized": true,
        "journal": journal.path().display().to_string(),
    }))
}

/// Check, and unless `check_only` deliver, every transaction on `input`.
///
/// A rejected transaction gets an error line and processing continues.
/// Malformed input and fatal ledger errors stop the run.
pub fn submit(config_path: &Path, check_only: bool, input: impl BufRead, out: &mut impl Write) -> CliResult<()> {
    let mut ledger = open_ledger(config_path)?;

    for tx in read_lines::<Tx>(input) {
        let tx = tx?;
        let response = match apply(&mut ledger, &tx, check_only) {
            Ok(data) => ok_response(data),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => error_response(e.code().code(), &e.to_string()),
        };
        write_line(out, &response)?;
    }
    Ok(())
}

fn apply(ledger: &mut Ledger, tx: &Tx, check_only: bool) -> LedgerResult<Value> {
    let checked = ledger.check(tx)?;
    if check_only {
        return Ok(json!({ "path": tx.msg.path(), "cost": checked.cost }));
    }
    let delivered = ledger.deliver(tx)?;
    Ok(json!({
        "path": tx.msg.path(),
        "cost": checked.cost,
        "result": serde_json::to_value(delivered)?,
    }))
}

/// Run the executor once at `now`
pub fn tick(config_path: &Path, now: &str) -> CliResult<()> {
    let now = UnixTime::parse(now)?;
    let mut ledger = open_ledger(config_path)?;
    let report = ledger.tick(now)?;
    write_response(serde_json::to_value(report)?)
}

/// Read-only lookup; `id` is shorthand for an 8-byte big-endian key
pub fn query(config_path: &Path, path: &str, data: Option<&str>, id: Option<u64>, prefix: bool) -> CliResult<()> {
    let key = match (data, id) {
        (Some(hex_data), _) => hex::decode(hex_data)
            .map_err(|e| CliError::InvalidArgument(format!("--data is not hex: {}", e)))?,
        (None, Some(id)) => RecordId::new(id).to_key().to_vec(),
        (None, None) => Vec::new(),
    };
    let mode = if prefix { QueryMode::Prefix } else { QueryMode::Exact };

    let ledger = open_ledger(config_path)?;
    let models = ledger.query(path, &key, mode)?;
    write_response(serde_json::to_value(models)?)
}
