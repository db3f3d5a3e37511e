// src/logging.rs

//! Logging setup for `buildcycle` using `tracing` + `tracing-subscriber`.
//!
//! The level applies to the `buildcycle` crate only; everything else stays
//! at `warn`. Priority:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `BUILDCYCLE_LOG`: a bare level ("debug") or a full filter directive
//!    ("buildcycle::lifecycle=trace,info")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for mojo output and
//! dry-run listings.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

const CRATE_TARGET: &str = "buildcycle";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var("BUILDCYCLE_LOG").ok();
    let directive = filter_directive(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{directive}'"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Filter directive for the given CLI level and `BUILDCYCLE_LOG` value.
pub fn filter_directive(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return crate_directive(level_name(level));
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => match parse_level_str(value) {
            Some(level) => crate_directive(level),
            None => value.to_string(),
        },
        None => crate_directive("info"),
    }
}

fn crate_directive(level: &str) -> String {
    format!("warn,{CRATE_TARGET}={level}")
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.to_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
