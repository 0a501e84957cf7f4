//! Command execution for verification steps.
//!
//! The [`CommandExecutor`] trait is the capability the orchestrator consumes;
//! [`ProcessExecutor`] is the `sh -c` backed implementation. Working
//! directory and environment are passed explicitly so suite runs are
//! reproducible and testable in isolation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::{GateError, Result};

/// Options governing one command invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecOptions {
    /// Working directory for the command.
    pub cwd: PathBuf,

    /// Environment variables overlaid on the inherited environment.
    pub env: BTreeMap<String, String>,

    /// Timeout in seconds (0 = no timeout).
    pub timeout_secs: u64,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            cwd: PathBuf::from("."),
            env: BTreeMap::new(),
            timeout_secs: 600,
        }
    }
}

/// Outcome of one command invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    /// Whether the command exited with status 0.
    pub succeeded: bool,

    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Wall-clock duration in seconds.
    pub elapsed_secs: f64,

    /// Execution-level error (non-zero exit, timeout, spawn refusal).
    pub error: Option<String>,
}

impl ExecutionResult {
    /// A successful result with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
            elapsed_secs: 0.0,
            error: None,
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
            elapsed_secs: 0.0,
            error: Some(format!("command exited with code {}", exit_code)),
        }
    }

    /// A failed result for a command that never ran to completion
    /// (spawn refusal, timeout).
    pub fn aborted(error: impl Into<String>, elapsed_secs: f64) -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            elapsed_secs,
            error: Some(error.into()),
        }
    }

    /// Stdout and stderr merged, stdout first.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Capability for running a shell command.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute `command` and capture its output.
    ///
    /// A non-zero exit is reported through the returned [`ExecutionResult`],
    /// not as an `Err`; `Err` means the process could not be started at all.
    async fn execute(&self, command: &str, options: &ExecOptions) -> Result<ExecutionResult>;
}

/// Executor backed by `sh -c` via tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, command: &str, options: &ExecOptions) -> Result<ExecutionResult> {
        let start = Instant::now();

        if command.trim().is_empty() {
            return Ok(ExecutionResult::aborted("empty command", 0.0));
        }

        debug!(command = %command, cwd = %options.cwd.display(), "Spawning command");

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&options.cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &options.env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(|e| GateError::Spawn {
            command: command.to_string(),
            source: e,
        })?;

        let output = if options.timeout_secs > 0 {
            match tokio::time::timeout(
                Duration::from_secs(options.timeout_secs),
                child.wait_with_output(),
            )
            .await
            {
                Ok(waited) => waited?,
                Err(_) => {
                    return Ok(ExecutionResult::aborted(
                        format!("command timed out after {} seconds", options.timeout_secs),
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        } else {
            child.wait_with_output().await?
        };

        let elapsed_secs = start.elapsed().as_secs_f64();
        let succeeded = output.status.success();
        let exit_code = output.status.code();

        let error = if succeeded {
            None
        } else {
            Some(match exit_code {
                Some(code) => format!("command exited with code {}", code),
                None => "command terminated by signal".to_string(),
            })
        };

        Ok(ExecutionResult {
            succeeded,
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            elapsed_secs,
            error,
        })
    }
}
