// src/exec/backend.rs

//! Pluggable process runner.
//!
//! The sync worker talks to a `ProcessRunner` instead of spawning processes
//! itself, so tests can swap in a fake that records commands and returns
//! scripted exit codes.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::debug;

use crate::errors::Result;

use super::command::SyncCommand;

/// What the worker observes of a finished sync process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait abstracting how a sync command is executed.
///
/// `execute` must only return once the process has exited. An `Err` means the
/// process could not be run at all (e.g. spawn failure); a non-zero exit is a
/// regular `Ok` output.
pub trait ProcessRunner: Send + Sync {
    fn execute<'a>(
        &'a self,
        command: &'a SyncCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>>;
}

/// Production runner: runs the command line through `sh -c` with
/// `tokio::process::Command`.
///
/// The line is quoted for a POSIX shell (see [`super::command::shell_quote`]),
/// so a POSIX `sh` is required on every platform; `cmd.exe` is not supported.
#[derive(Debug, Clone, Default)]
pub struct ShellProcessRunner;

impl ShellProcessRunner {
    fn shell_command(line: &str) -> Command {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

impl ProcessRunner for ShellProcessRunner {
    fn execute<'a>(
        &'a self,
        command: &'a SyncCommand,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutput>> + Send + 'a>> {
        Box::pin(async move {
            let line = command.shell_line();
            let mut cmd = Self::shell_command(&line);
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let output = cmd
                .output()
                .await
                .with_context(|| format!("running `{line}`"))?;

            for out_line in String::from_utf8_lossy(&output.stdout).lines() {
                debug!(destination = %command.destination, "stdout: {}", out_line);
            }

            Ok(ProcessOutput {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        })
    }
}
