// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::FailureBehaviour;

/// Command-line arguments for `buildcycle`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildcycle",
    version,
    about = "Run lifecycle phases and plugin goals across a multi-project build.",
    long_about = None
)]
pub struct CliArgs {
    /// Phases (e.g. `install`) or goals (`prefix:goal`,
    /// `groupId:artifactId[:version]:goal`) to run, in order.
    ///
    /// Default: the top-level project's `default_goal`.
    #[arg(value_name = "TASK")]
    pub goals: Vec<String>,

    /// Path to the build file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Buildcycle.toml")]
    pub config: String,

    /// Stop at the first project failure (default).
    #[arg(long, conflicts_with_all = ["fail_at_end", "fail_never"])]
    pub fail_fast: bool,

    /// Skip projects depending on a failed project, build the rest, fail at
    /// the end.
    #[arg(long, conflicts_with = "fail_never")]
    pub fail_at_end: bool,

    /// Record failures but never fail the build.
    #[arg(long)]
    pub fail_never: bool,

    /// Disable mojos that require network access.
    #[arg(short = 'o', long)]
    pub offline: bool,

    /// User property, overriding project properties (`-D key=value`).
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_property)]
    pub define: Vec<(String, String)>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDCYCLE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate, print the reactor order, task segments and phase bindings,
    /// but don't run any mojo.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Failure behaviour selected on the command line, if any.
    pub fn failure_behaviour(&self) -> Option<FailureBehaviour> {
        if self.fail_never {
            Some(FailureBehaviour::FailNever)
        } else if self.fail_at_end {
            Some(FailureBehaviour::FailAtEnd)
        } else if self.fail_fast {
            Some(FailureBehaviour::FailFast)
        } else {
            None
        }
    }
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.trim().is_empty() => Err(format!("missing property name in '{s}'")),
        Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
        // `-Dflag` means `flag=true`.
        None if !s.trim().is_empty() => Ok((s.trim().to_string(), "true".to_string())),
        None => Err("empty property".to_string()),
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
