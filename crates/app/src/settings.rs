//! Handles settings for the application. Configuration is read from
//! `config/settings.toml` (or the file named by `REGBOT_CONFIG`) and can be
//! overridden by `REGBOT_*` environment variables, e.g.
//! `REGBOT_TELEGRAM__TOKEN`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
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

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("regbot.db".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub database: Database,
    pub telegram: Option<Telegram>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path =
            std::env::var("REGBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Config::builder()
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("REGBOT").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn try_parse(raw: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn parse(raw: &str) -> Settings {
        try_parse(raw).unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.database, Database::Sqlite("regbot.db".to_string()));
        assert!(settings.telegram.is_none());
    }

    #[test]
    fn full_file() {
        let settings = parse(
            r#"
            database = "memory"

            [app]
            level = "debug"

            [telegram]
            token = "123:abc"
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.telegram.unwrap().token, "123:abc");
    }

    #[test]
    fn sqlite_path() {
        let settings = parse(r#"database = { sqlite = "data/users.db" }"#);
        assert_eq!(settings.database, Database::Sqlite("data/users.db".to_string()));
    }

    #[test]
    fn database_inside_app_is_rejected() {
        let result = try_parse(
            r#"
            [app]
            level = "info"
            database = "memory"
            "#,
        );
        assert!(result.is_err());
    }
}
