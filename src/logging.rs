//! # Structured Logging
//!
//! Initializes the `tracing` subscriber for the command-line front end.
//! Output goes to stderr so stdout stays clean for envelopes and JSON.

use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::TxAsmError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// JSON lines.
    Json,
}

impl FromStr for LogFormat {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(TxAsmError::Config(format!("unknown log format {:?}", other))),
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides `default_level` when set, e.g.
///
/// ```text
/// RUST_LOG=stellar_txasm=debug
/// ```
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(default_level: &str, format: LogFormat) -> Result<(), TxAsmError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr).with_target(true))
            .try_init(),
    };
    installed.map_err(|e| TxAsmError::Config(format!("logging already initialized: {}", e)))?;

    tracing::debug!("logging initialized (format={:?})", format);
    Ok(())
}
