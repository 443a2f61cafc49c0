//! Settings for the application, read from an optional `settings.toml` and
//! from `CASA__`-prefixed environment variables (e.g. `CASA__APP__LEVEL`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Engine {
    /// Account funding USD incomes converted to CUP in shared accounts.
    pub principal_account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    #[serde(default)]
    pub engine: Engine,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("database", "memory")?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("CASA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
