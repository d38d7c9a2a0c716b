// miio.rs
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{CommandRunner, Invocation, capture};
use crate::{config::ControlSettings, error::AppError};

/// `miiocli` wrapper, one process per command.
pub struct MiioCli {
    program: String,
    timeout: Duration,
}

impl MiioCli {
    pub fn new(settings: &ControlSettings) -> Self {
        Self {
            program: settings.program.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl CommandRunner for MiioCli {
    async fn run(&self, args: Vec<String>) -> Result<Invocation, AppError> {
        debug!(program = %self.program, ?args, "invoking control tool");

        let mut command = Command::new(&self.program);
        command.args(&args);
        capture(&mut command, &self.program, self.timeout).await
    }

    fn program(&self) -> &str {
        &self.program
    }
}
