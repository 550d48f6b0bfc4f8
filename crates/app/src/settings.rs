//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `TALLY__*` environment variables, e.g.
//! `TALLY__APP__LEVEL=debug`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [database]
//! sqlite = "./tally.db"
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SQLITE_PATH: &str = "./tally.db";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Database::Sqlite(DEFAULT_SQLITE_PATH.to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
