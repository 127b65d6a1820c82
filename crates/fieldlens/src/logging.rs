//! Logging setup for the Fieldlens CLI.
//!
//! The `[logging]` config section drives the default level and format;
//! `--verbose` and `--json-logs` override it, and `RUST_LOG` overrides
//! everything. Logs go to stderr so stdout stays clean for identification
//! output.

use fieldlens_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber from config plus CLI overrides.
pub fn init(config: &LoggingConfig, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug"
    } else {
        effective_level(&config.level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_logs || config.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Map the configured level string to a filter directive, falling back to
/// "info" for anything unrecognized rather than failing startup.
fn effective_level(level: &str) -> &str {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => level,
        _ => "info",
    }
}
