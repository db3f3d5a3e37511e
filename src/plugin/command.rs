// src/plugin/command.rs

//! Shell runner for mojo commands.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, info};

/// How a mojo command process finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failed(i32),
}

/// Run `cmd` through the platform shell in `working_dir` with extra
/// environment variables. Output is inherited so mojo output reaches the
/// terminal directly.
pub fn run_mojo_command(
    goal: &str,
    cmd: &str,
    working_dir: &Path,
    env: &[(String, String)],
) -> Result<CommandOutcome> {
    info!(goal, cmd, dir = %working_dir.display(), "running mojo command");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(working_dir)
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = command
        .status()
        .with_context(|| format!("spawning process for goal '{goal}'"))?;

    let code = status.code().unwrap_or(-1);
    debug!(goal, exit_code = code, success = status.success(), "mojo command exited");

    Ok(if status.success() {
        CommandOutcome::Success
    } else {
        CommandOutcome::Failed(code)
    })
}
