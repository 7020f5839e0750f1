//! External protocol tool invocation
//!
//! The query and transfer tools are run as child processes. Their outcome is
//! always a value: a non-zero exit, a spawn failure or a timeout is a
//! [`InvocationStatus::Failure`] with whatever output is available, never an
//! error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Exit classification of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationStatus {
    Success,
    Failure,
}

/// Result of running a protocol tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    /// Standard output followed by standard error
    pub combined_output: String,

    pub status: InvocationStatus,

    /// Wall time from spawn to exit (or timeout)
    pub elapsed: Duration,
}

impl InvocationOutcome {
    /// A successful outcome with the given output
    pub fn success(combined_output: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            combined_output: combined_output.into(),
            status: InvocationStatus::Success,
            elapsed,
        }
    }

    /// A failed outcome with the given output
    pub fn failure(combined_output: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            combined_output: combined_output.into(),
            status: InvocationStatus::Failure,
            elapsed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == InvocationStatus::Success
    }

    /// Elapsed wall time in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Runs an external protocol command
#[async_trait]
pub trait ProtocolInvoker: Send + Sync {
    /// Run `command` with `args`, waiting at most `timeout`
    async fn invoke(&self, command: &str, args: &[String], timeout: Duration)
        -> InvocationOutcome;
}

/// [`ProtocolInvoker`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker;

impl ProcessInvoker {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProtocolInvoker for ProcessInvoker {
    async fn invoke(
        &self,
        command: &str,
        args: &[String],
        timeout: Duration,
    ) -> InvocationOutcome {
        tracing::debug!(command, args = %args.join(" "), "Invoking protocol tool");

        let started = Instant::now();
        let child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command, error = %e, "Failed to start protocol tool");
                return InvocationOutcome::failure(
                    format!("Failed to start {command}: {e}"),
                    started.elapsed(),
                );
            }
        };

        // Dropping the wait future on timeout kills the child
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                let elapsed = started.elapsed();

                if output.status.success() {
                    InvocationOutcome::success(combined, elapsed)
                } else {
                    tracing::warn!(
                        command,
                        exit_status = %output.status,
                        "Protocol tool exited with failure"
                    );
                    InvocationOutcome::failure(combined, elapsed)
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(command, error = %e, "Failed to collect protocol tool output");
                InvocationOutcome::failure(
                    format!("Failed to collect output of {command}: {e}"),
                    started.elapsed(),
                )
            }
            Err(_) => {
                tracing::warn!(
                    command,
                    timeout_secs = timeout.as_secs(),
                    "Protocol tool timed out"
                );
                InvocationOutcome::failure(String::new(), started.elapsed())
            }
        }
    }
}
