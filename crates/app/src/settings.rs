//! Settings of the `envelope` binary, read from `settings.toml` (or the file
//! given with `--config`) and overridden by `ENVELOPE__*` environment
//! variables, e.g. `ENVELOPE__SERVER__PORT=8080`.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "envelope", about = "Envelope budgeting server")]
struct Args {
    /// Config file path, with or without the `.toml` extension.
    #[arg(long, env = "ENVELOPE_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level of the workspace crates (`trace` .. `error`).
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the database file, created when missing.
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
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("ENVELOPE").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sqlite_database_from_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "envelope.db" }
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.server.database.url(), "sqlite:envelope.db?mode=rwc");
    }

    #[test]
    fn memory_database_and_default_level() {
        let settings = parse(
            r#"
            [server]
            bind = "0.0.0.0"
            port = 8080
            database = "memory"
            "#,
        );
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind.as_deref(), Some("0.0.0.0"));
        assert_eq!(settings.server.database.url(), "sqlite::memory:");
    }
}
