//! API server configuration.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults      AppConfig::default()                         │
//! │  2. Config file            ./stockroom.toml (or $STOCKROOM_CONFIG)      │
//! │                            optional, missing file is fine               │
//! │  3. Environment            STOCKROOM_PORT=8080                          │
//! │                            STOCKROOM_ALLOWED_ORIGINS=http://a,http://b  │
//! │                                                                         │
//! │  Later sources override earlier ones, then validate() runs.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::env;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use stockroom_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "STOCKROOM_CONFIG";

/// Config file read when `STOCKROOM_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "stockroom.toml";

const ENV_PREFIX: &str = "STOCKROOM";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-line output for development
    #[default]
    Pretty,
    /// One JSON object per line for log shippers
    Json,
}

/// API server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Origins allowed to call the API from a browser. Empty disables CORS.
    pub allowed_origins: Vec<String>,

    pub log_format: LogFormat,

    /// Page size of `/api/transactions` when `limit` is not given
    pub default_page_size: i64,

    /// Largest `limit` a client may ask for
    pub max_page_size: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_path: PathBuf::from("./stockroom.db"),
            max_connections: 5,
            allowed_origins: Vec::new(),
            log_format: LogFormat::Pretty,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    /// Loads configuration from defaults, the config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let builder = Self::defaults()?
            .add_source(File::from(PathBuf::from(path)).required(false))
            .add_source(environment());

        Self::from_builder(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder().add_source(Config::try_from(&AppConfig::default())?))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid("host", "must not be empty"));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::invalid("max_connections", "must be at least 1"));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.max_page_size) {
            return Err(ConfigError::invalid(
                "max_page_size",
                format!("must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            return Err(ConfigError::invalid(
                "default_page_size",
                "must be between 1 and max_page_size",
            ));
        }

        if let Some(origin) = self
            .allowed_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(ConfigError::invalid(
                "allowed_origins",
                format!("'{}' is not an http(s) origin", origin),
            ));
        }

        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("allowed_origins")
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn env_source(vars: &[(&str, &str)]) -> Environment {
        environment().source(Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_builder(AppConfig::defaults().unwrap()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_file_then_environment() {
        let builder = AppConfig::defaults()
            .unwrap()
            .add_source(File::from_str(
                r#"
                port = 8080
                log_format = "json"
                database_path = "/var/lib/stockroom/data.db"
                "#,
                FileFormat::Toml,
            ))
            .add_source(env_source(&[
                ("STOCKROOM_PORT", "9090"),
                (
                    "STOCKROOM_ALLOWED_ORIGINS",
                    "http://localhost:5173,https://shop.example",
                ),
            ]));

        let config = AppConfig::from_builder(builder).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/stockroom/data.db")
        );
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://shop.example"]
        );
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_page = AppConfig {
            default_page_size: 500,
            ..Default::default()
        };
        assert!(matches!(
            bad_page.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "default_page_size"
        ));

        let bad_origin = AppConfig {
            allowed_origins: vec!["*".into()],
            ..Default::default()
        };
        assert!(bad_origin.validate().is_err());

        let builder = AppConfig::defaults()
            .unwrap()
            .add_source(env_source(&[("STOCKROOM_PORT", "not-a-port")]));
        assert!(matches!(
            AppConfig::from_builder(builder),
            Err(ConfigError::Load(_))
        ));
    }
}
