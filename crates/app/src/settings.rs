//! Application settings, read from `settings.toml` and the `SHOPBOOK_*`
//! environment (environment wins). See `settings.toml` for the layout.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub url: String,
    pub service_key: String,
    pub owner_email: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub store: Store,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SHOPBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
