//! Handles settings for the application. Configuration is written in
//! `settings.toml`.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Ledger policy knobs: the two group names the identity provider emits and
/// the default drink price.
#[derive(Debug, Deserialize)]
pub struct Ledger {
    #[serde(default = "default_member_group")]
    pub member_group: String,
    #[serde(default = "default_admin_group")]
    pub admin_group: String,
    #[serde(default = "default_drink_cost_cents")]
    pub drink_cost_cents: i64,
}

fn default_member_group() -> String {
    "members".to_string()
}

fn default_admin_group() -> String {
    "admins".to_string()
}

fn default_drink_cost_cents() -> i64 {
    engine::DEFAULT_DRINK_COST.cents()
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            member_group: default_member_group(),
            admin_group: default_admin_group(),
            drink_cost_cents: default_drink_cost_cents(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}
