// handle.rs
use std::sync::Arc;

use super::CommandRunner;
use crate::{color::Color, error::AppError, models::Device};

/// Kind token the control tool uses for Yeelight color bulbs.
pub const BULB_KIND: &str = "yeelight";

const ERROR_MARKER: &str = "Error:";

/// A discovered device bound to the runner that controls it.
///
/// Every command is a single blocking tool invocation with no retry.
#[derive(Clone)]
pub struct DeviceHandle {
    device: Arc<Device>,
    runner: Arc<dyn CommandRunner>,
}

impl DeviceHandle {
    pub fn new(device: Arc<Device>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { device, runner }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn name(&self) -> &str {
        &self.device.name
    }

    pub fn kind(&self) -> Result<&'static str, AppError> {
        if self.device.is_bulb() {
            return Ok(BULB_KIND);
        }

        Err(AppError::UnsupportedDeviceKind {
            name: self.device.name.clone(),
            model: self.device.model.clone(),
        })
    }

    pub async fn turn_on(&self) -> Result<(), AppError> {
        self.command("on", Vec::new()).await
    }

    pub async fn turn_off(&self) -> Result<(), AppError> {
        self.command("off", Vec::new()).await
    }

    pub async fn toggle(&self) -> Result<(), AppError> {
        self.command("toggle", Vec::new()).await
    }

    pub async fn set_color(&self, color: Color) -> Result<(), AppError> {
        self.command(
            "set_rgb",
            vec![
                color.red.to_string(),
                color.green.to_string(),
                color.blue.to_string(),
            ],
        )
        .await
    }

    pub async fn set_color_hex(&self, hex: &str) -> Result<(), AppError> {
        let color = Color::from_hex(hex)?;
        self.set_color(color).await
    }

    pub async fn set_brightness(&self, level: i64) -> Result<(), AppError> {
        self.command("set_brightness", vec![level.to_string()]).await
    }

    pub async fn set_color_temperature(&self, level: i64) -> Result<(), AppError> {
        self.command("set_color_temp", vec![level.to_string()]).await
    }

    fn args(&self, command: &str, extra: Vec<String>) -> Result<Vec<String>, AppError> {
        let mut args = vec![
            self.kind()?.to_string(),
            "--token".to_string(),
            self.device.token.clone(),
            "--ip".to_string(),
            self.device.local_ip.clone(),
            command.to_string(),
        ];
        args.extend(extra);
        Ok(args)
    }

    async fn command(&self, command: &str, extra: Vec<String>) -> Result<(), AppError> {
        let args = self.args(command, extra)?;
        let invocation = self.runner.run(args).await?;

        if !invocation.success() {
            return Err(AppError::ExecutionFailed {
                program: self.runner.program().to_string(),
                reason: invocation.failure_reason(),
            });
        }

        if invocation.stderr.contains(ERROR_MARKER) {
            return Err(AppError::CommandFailed(invocation.stderr));
        }

        Ok(())
    }
}
