//! # Structured Logging
//!
//! Initializes the `tracing` subscriber for the host binary. Output goes
//! to stderr so that stdout stays reserved for command results — the `run`
//! subcommand prints one JSON result line per command, and mixing log
//! lines into that stream would corrupt it for downstream consumers.
//!
//! The default level comes from the caller; `RUST_LOG` overrides it with
//! full `EnvFilter` directive syntax, e.g.
//! `RUST_LOG=aegis_node=debug,aegis_engine=info`.

use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for terminals.
    Pretty,
    /// JSON lines for log aggregation.
    Json,
}

impl LogFormat {
    /// Parses a format string. Accepts "json" or "pretty" (case-insensitive);
    /// anything else falls back to `Pretty`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initializes the global tracing subscriber. Call once, early in `main()`.
pub fn init(default_directives: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }

    tracing::debug!(?format, "logging initialized");
}
