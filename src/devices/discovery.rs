// discovery.rs
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{Discovery, capture};
use crate::{config::MiSettings, error::AppError, models::Device};

/// Runs the cloud token extractor script and reads its JSON device list.
pub struct Extractor {
    python: String,
    script: String,
    username: String,
    password: String,
    server: String,
    timeout: Duration,
}

impl Extractor {
    pub fn new(settings: &MiSettings) -> Self {
        Self {
            python: settings.python.clone(),
            script: settings.extractor.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            server: settings.server.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[async_trait]
impl Discovery for Extractor {
    async fn discover(&self) -> Result<Vec<Device>, AppError> {
        debug!(python = %self.python, script = %self.script, "running device extractor");

        let mut command = Command::new(&self.python);
        command
            .arg(&self.script)
            .env("MI_USERNAME", &self.username)
            .env("MI_PASSWORD", &self.password)
            .env("MI_SERVER", &self.server);

        let invocation = capture(&mut command, &self.python, self.timeout).await?;
        if !invocation.success() {
            return Err(AppError::ExecutionFailed {
                program: self.python.clone(),
                reason: invocation.failure_reason(),
            });
        }

        parse_devices(&invocation.stdout)
    }
}

pub fn parse_devices(stdout: &str) -> Result<Vec<Device>, AppError> {
    serde_json::from_str(stdout)
        .map_err(|e| AppError::Discovery(format!("unmarshal json of stdout: {e}")))
}
