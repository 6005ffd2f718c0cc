//! # CLI Interface
//!
//! Defines the command-line argument structure for `aegis-node` using
//! `clap` derive. Supports four subcommands: `init`, `run`, `events`,
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AEGIS custody wallet host.
///
/// A single-process hosting runtime for the AEGIS quorum custody engine.
/// It authenticates callers by explicit address, serializes every
/// operation, performs value transfers over an in-memory account ledger,
/// and persists the whole wallet state as a JSON snapshot.
#[derive(Parser, Debug)]
#[command(
    name = "aegis-node",
    about = "AEGIS custody wallet host runtime",
    version,
    propagate_version = true
)]
pub struct AegisNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the AEGIS node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new wallet state file.
    Init(InitArgs),
    /// Apply a command script (JSON lines) against a wallet state file.
    Run(RunArgs),
    /// Print the event log of a wallet state file.
    Events(EventsArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path of the state file to create.
    #[arg(long, short = 's', env = "AEGIS_STATE", default_value = "aegis-state.json")]
    pub state: PathBuf,

    /// Hex-encoded owner address (40 hex characters).
    #[arg(long)]
    pub owner: String,

    /// Hex-encoded signer address. Repeat the flag for each signer.
    #[arg(long = "signer", required = true)]
    pub signers: Vec<String>,

    /// Number of distinct signer approvals required to execute.
    #[arg(long)]
    pub quorum: usize,

    /// Hex-encoded recovery address.
    #[arg(long)]
    pub recovery: String,

    /// Initial treasury balance available for outbound value transfers.
    #[arg(long, default_value_t = 0)]
    pub treasury: u64,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path of the state file to load and update.
    #[arg(long, short = 's', env = "AEGIS_STATE", default_value = "aegis-state.json")]
    pub state: PathBuf,

    /// JSON-lines command script. Reads stdin when omitted.
    #[arg(long, short = 'f')]
    pub script: Option<PathBuf>,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "AEGIS_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `events` subcommand.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Path of the state file to read.
    #[arg(long, short = 's', env = "AEGIS_STATE", default_value = "aegis-state.json")]
    pub state: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        AegisNodeCli::command().debug_assert();
    }
}
