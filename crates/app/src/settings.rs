//! Settings for the application, read from `settings.toml`.
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! database = { sqlite = "kopilka.db" }
//!
//! [telegram]
//! token = "..."
//! allowed_ids = [586995184, 1319991227]
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 8080
//! ```
//!
//! `database = "memory"` selects an in-memory database. The `[telegram]`
//! and `[server]` sections are both optional.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    pub allowed_ids: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub telegram: Option<Telegram>,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
