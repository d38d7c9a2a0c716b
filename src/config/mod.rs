// config/mod.rs
use std::path::Path;

use config::Config;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub mi: MiSettings,
    pub control: ControlSettings,
    pub dance: DanceSettings,
    pub metrics: MetricsSettings,
    /// Older top-level name for `server.address`. Wins when present.
    #[serde(default)]
    listen: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub address: String,
    pub api_docs: bool,
}

/// Xiaomi cloud credentials handed to the extractor script.
#[derive(Debug, Deserialize)]
pub struct MiSettings {
    pub extractor: String,
    pub username: String,
    pub password: String,
    pub server: String,
    pub python: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlSettings {
    pub program: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DanceSettings {
    pub duration_secs: u64,
    pub tick_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Settings {
    /// Reads `path`, then applies `MIHOME_` environment overrides
    /// (`MIHOME_MI__PASSWORD` sets `mi.password`).
    pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::load`] with environment lookups going through
    /// `env`. The unprefixed `LISTEN`, `EXTRACTOR`, `MI_USERNAME`,
    /// `MI_PASSWORD` and `MI_SERVER` variables are honoured last.
    pub fn load_with(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.address", "0.0.0.0:5000")?
            .set_default("server.api_docs", false)?
            .set_default("mi.python", "python3")?
            .set_default("mi.timeout_secs", 120)?
            .set_default("control.program", "miiocli")?
            .set_default("control.timeout_secs", 10)?
            .set_default("dance.duration_secs", 20)?
            .set_default("dance.tick_ms", 250)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000)?
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("MIHOME")
                    .prefix_separator("_")
                    .separator("__"),
            );

        for (var, key) in LEGACY_ENV {
            builder = builder.set_override_option(key, env(var))?;
        }

        let mut settings: Self = builder.build()?.try_deserialize()?;
        if let Some(listen) = settings.listen.take() {
            settings.server.address = listen_address(&listen);
        }

        Ok(settings)
    }
}

const LEGACY_ENV: [(&str, &str); 5] = [
    ("LISTEN", "listen"),
    ("EXTRACTOR", "mi.extractor"),
    ("MI_USERNAME", "mi.username"),
    ("MI_PASSWORD", "mi.password"),
    ("MI_SERVER", "mi.server"),
];

/// `:5000` means every interface.
fn listen_address(listen: &str) -> String {
    match listen.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => listen.to_string(),
    }
}
