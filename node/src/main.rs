// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # AEGIS Host Node
//!
//! Entry point for the `aegis-node` binary. Parses CLI arguments,
//! initializes logging, and drives the in-memory host runtime.
//!
//! The binary supports four subcommands:
//!
//! - `init`    — create a wallet state file from an initial configuration
//! - `run`     — apply a JSON-lines command script against a state file
//! - `events`  — print a state file's event log
//! - `version` — print build version information

mod cli;
mod host;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;

use aegis_engine::identity::Address;
use aegis_engine::wallet::CustodyWallet;

use cli::{AegisNodeCli, Commands};
use host::{AccountLedger, Command, Host};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = AegisNodeCli::parse();

    match cli.command {
        Commands::Init(args) => init_state(args),
        Commands::Run(args) => run_script(args),
        Commands::Events(args) => print_events(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Creates a wallet state file from the CLI configuration.
fn init_state(args: cli::InitArgs) -> Result<()> {
    logging::init("aegis_node=info,aegis_engine=info", LogFormat::Pretty);

    let owner = parse_address(&args.owner, "owner")?;
    let recovery = parse_address(&args.recovery, "recovery")?;
    let signers = args
        .signers
        .iter()
        .map(|s| parse_address(s, "signer"))
        .collect::<Result<Vec<_>>>()?;

    let wallet = CustodyWallet::new(owner, signers, args.quorum, recovery)
        .context("invalid wallet configuration")?;
    let host = Host::new(wallet, AccountLedger::with_treasury(args.treasury));
    host.save(&args.state)?;

    println!("Wallet state initialized.");
    println!("  State file : {}", args.state.display());
    println!("  Owner      : {}", owner);
    println!("  Signers    : {}", args.signers.join(", "));
    println!("  Quorum     : {}", args.quorum);
    println!("  Recovery   : {}", recovery);
    println!("  Treasury   : {}", args.treasury);
    Ok(())
}

/// Applies a command script and persists the resulting state.
///
/// Commands are JSON objects, one per line; blank lines and `#` comments
/// are skipped. Engine-level failures are reported on stdout and do not
/// stop the script — they are outcomes, not host errors.
fn run_script(args: cli::RunArgs) -> Result<()> {
    logging::init(
        "aegis_node=info,aegis_engine=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let host = Host::load(&args.state)?;

    let lines: Vec<String> = match &args.script {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            raw.lines().map(str::to_string).collect()
        }
        None => std::io::stdin()
            .lock()
            .lines()
            .collect::<std::io::Result<_>>()
            .context("failed to read commands from stdin")?,
    };

    let mut applied = 0usize;
    let mut rejected = 0usize;
    for (number, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let command: Command = serde_json::from_str(trimmed)
            .with_context(|| format!("malformed command on line {}", number + 1))?;

        match host.apply(command) {
            Ok(Some(id)) => {
                applied += 1;
                println!(r#"{{"ok": true, "id": "{id}"}}"#);
            }
            Ok(None) => {
                applied += 1;
                println!(r#"{{"ok": true}}"#);
            }
            Err(err) => {
                rejected += 1;
                println!(
                    r#"{{"ok": false, "error": {}}}"#,
                    serde_json::to_string(&err.to_string())?
                );
            }
        }
    }

    host.save(&args.state)?;
    tracing::info!(applied, rejected, "script finished, state saved");
    Ok(())
}

/// Prints the event log of a state file, one JSON entry per line.
fn print_events(args: cli::EventsArgs) -> Result<()> {
    let host = Host::load(&args.state)?;
    for entry in host.wallet().events().entries() {
        println!("{}", serde_json::to_string(entry)?);
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("aegis-node {}", env!("CARGO_PKG_VERSION"));
    println!("engine     {}", aegis_engine::config::ENGINE_VERSION);
}

/// Parses a hex address argument with a readable failure message.
fn parse_address(s: &str, what: &str) -> Result<Address> {
    Address::from_hex(s).with_context(|| format!("invalid {} address: {}", what, s))
}
