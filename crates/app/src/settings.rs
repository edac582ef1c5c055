//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `FINBOOK__*` environment variables
//! (`FINBOOK__APP__LEVEL=debug`, `FINBOOK__DATABASE__SQLITE=ledger.db`).
//!
//! See `settings.toml` for an example.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("finbook.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    #[serde(default)]
    pub database: Database,
    /// Acting user when `--user` is not given.
    pub user: Option<String>,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("FINBOOK").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
