// devices/mod.rs
mod discovery;
mod handle;
mod miio;

pub use discovery::Extractor;
pub use handle::DeviceHandle;
pub use miio::MiioCli;

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::{error::AppError, models::Device};

/// Captured result of one external process run.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn failure_reason(&self) -> String {
        let status = match self.exit_code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };

        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{status}: {stderr}")
        }
    }
}

impl From<Output> for Invocation {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        }
    }
}

/// Runs the external control tool with a prepared argument vector.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: Vec<String>) -> Result<Invocation, AppError>;

    fn program(&self) -> &str;
}

/// Produces the device list once at startup.
#[async_trait::async_trait]
pub trait Discovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<Device>, AppError>;
}

/// Spawns `command`, waits for it with a deadline and collects both streams.
/// The child is killed if the deadline passes or the future is dropped.
pub(crate) async fn capture(
    command: &mut Command,
    program: &str,
    timeout: Duration,
) -> Result<Invocation, AppError> {
    command.stdin(Stdio::null()).kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Err(_) => Err(AppError::Timeout(timeout)),
        Ok(Err(e)) => Err(AppError::ExecutionFailed {
            program: program.to_string(),
            reason: e.to_string(),
        }),
        Ok(Ok(output)) => Ok(Invocation::from(output)),
    }
}
