use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::dispatch::{Dispatcher, sequence::Timing};

const BULB_PREFIX: &str = "yeelink.light.color";
const VACUUM_PREFIX: &str = "viomi.vacuum.";
const SWITCH_PREFIX: &str = "chuangmi.plug.";
const LAMP_PREFIX: &str = "yeelink.light.bslamp";

/// Device record as reported by the cloud extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub name: String,
    pub id: String,
    pub mac: String,
    pub local_ip: String,
    pub token: String,
    pub model: String,
}

impl Device {
    pub fn is_bulb(&self) -> bool {
        self.model.starts_with(BULB_PREFIX)
    }

    pub fn is_vacuum(&self) -> bool {
        self.model.starts_with(VACUUM_PREFIX)
    }

    pub fn is_switch(&self) -> bool {
        self.model.starts_with(SWITCH_PREFIX)
    }

    pub fn is_lamp(&self) -> bool {
        self.model.starts_with(LAMP_PREFIX)
    }
}

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub dance: Timing,
    pub shutdown: CancellationToken,
    /// Serve `/api-doc/openapi.json`. Off unless configured.
    pub api_docs: bool,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, dance: Timing, shutdown: CancellationToken) -> Self {
        Self {
            dispatcher,
            dance,
            shutdown,
            api_docs: false,
        }
    }

    pub fn with_api_docs(mut self, enabled: bool) -> Self {
        self.api_docs = enabled;
        self
    }
}
