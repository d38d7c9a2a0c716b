// commands/mod.rs
use crate::{devices::DeviceHandle, error::AppError};

/// Single-shot bulb commands, applied the same way to every bulb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulbCommand {
    On,
    Off,
    Toggle,
    Brightness(i64),
    Temperature(i64),
    Color(String),
}

impl BulbCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
            Self::Brightness(_) => "brightness",
            Self::Temperature(_) => "temperature",
            Self::Color(_) => "color",
        }
    }

    pub async fn apply(self, handle: DeviceHandle) -> Result<(), AppError> {
        match self {
            Self::On => handle.turn_on().await,
            Self::Off => handle.turn_off().await,
            Self::Toggle => handle.toggle().await,
            Self::Brightness(level) => handle.set_brightness(level).await,
            Self::Temperature(level) => handle.set_color_temperature(level).await,
            Self::Color(hex) => handle.set_color_hex(&hex).await,
        }
    }
}
