//! Application configuration

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::serde_as;

use crate::errors::FreightDeskError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Tried when `port` is already taken.
    #[serde(default = "default_backup_port")]
    pub backup_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Base URL and bearer key of one upstream data API
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ApiConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default)]
    pub use_mock_data: bool,
    #[serde(default)]
    pub q88: ApiConfig,
    #[serde(default)]
    pub ffa: ApiConfig,
    #[serde(default = "default_ffa_sheet_path")]
    pub ffa_sheet_path: PathBuf,
    #[serde(default = "default_q88_pdf_directory")]
    pub q88_pdf_directory: PathBuf,
    #[serde(default = "default_mock_vessel_count")]
    pub mock_vessel_count: usize,
    #[serde(default = "default_mock_ffa_count")]
    pub mock_ffa_count: usize,
    #[serde(default = "default_days_of_history")]
    pub days_of_history: u32,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_interval")]
    pub interval: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_backup_port() -> u16 {
    3001
}

fn default_max_connections() -> u32 {
    5
}

fn default_ffa_sheet_path() -> PathBuf {
    PathBuf::from("./documents/FFA Oil Curves.csv")
}

fn default_q88_pdf_directory() -> PathBuf {
    PathBuf::from("./documents")
}

fn default_mock_vessel_count() -> usize {
    5
}

fn default_mock_ffa_count() -> usize {
    8
}

fn default_days_of_history() -> u32 {
    30
}

fn default_interval() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backup_port: default_backup_port(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            use_mock_data: false,
            q88: ApiConfig::default(),
            ffa: ApiConfig::default(),
            ffa_sheet_path: default_ffa_sheet_path(),
            q88_pdf_directory: default_q88_pdf_directory(),
            mock_vessel_count: default_mock_vessel_count(),
            mock_ffa_count: default_mock_ffa_count(),
            days_of_history: default_days_of_history(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: default_interval(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/default")
    }

    /// Load from the given file (optional) overlaid with `FREIGHTDESK__*` variables
    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("FREIGHTDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), FreightDeskError> {
        self.database.validate()?;
        self.server.validate()?;
        self.schedule.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), FreightDeskError> {
        if self.url.trim().is_empty() {
            return Err(FreightDeskError::ConfigurationError {
                message: "Database URL cannot be empty".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(FreightDeskError::ConfigurationError {
                message: "Database pool needs at least one connection".to_string(),
            });
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), FreightDeskError> {
        if self.port == self.backup_port {
            return Err(FreightDeskError::ConfigurationError {
                message: "Backup port must differ from the primary port".to_string(),
            });
        }
        Ok(())
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), FreightDeskError> {
        if self.interval.is_zero() {
            return Err(FreightDeskError::ConfigurationError {
                message: "Fetch interval must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl ApiConfig {
    /// Both URL and key, or a configuration error naming the API
    pub fn credentials(&self, api: &str) -> Result<(&str, &str), FreightDeskError> {
        match (self.url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Ok((url, key)),
            _ => Err(FreightDeskError::ConfigurationError {
                message: format!("{} API URL or API Key not configured", api),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_load_config() {
        env::set_var("FREIGHTDESK__DATABASE__URL", "postgres://localhost/freight");
        env::set_var("FREIGHTDESK__SOURCES__USE_MOCK_DATA", "true");
        env::set_var("FREIGHTDESK__SOURCES__Q88__URL", "https://q88.example.com");
        env::set_var("FREIGHTDESK__SCHEDULE__INTERVAL", "3600");

        let config = AppConfig::load_from("does/not/exist").unwrap();
        assert_eq!(config.database.url, "postgres://localhost/freight");
        assert!(config.sources.use_mock_data);
        assert_eq!(
            config.sources.q88.url.as_deref(),
            Some("https://q88.example.com")
        );
        assert_eq!(config.schedule.interval, Duration::from_secs(3600));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.backup_port, 3001);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freight.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080
backup_port = 8081

[database]
url = "postgres://db/freight"
max_connections = 2

[sources]
days_of_history = 10
"#
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.sources.days_of_history, 10);
        assert_eq!(config.sources.mock_ffa_count, 8);
    }

    #[test]
    fn test_database_config_validate() {
        let config = DatabaseConfig {
            url: "postgres://localhost/freight".to_string(),
            max_connections: 5,
        };
        assert!(config.validate().is_ok());

        let config = DatabaseConfig {
            url: " ".to_string(),
            max_connections: 5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_server_config_validate_same_ports() {
        let config = ServerConfig {
            host: default_host(),
            port: 3000,
            backup_port: 3000,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_schedule_config_validate_zero_interval() {
        let config = ScheduleConfig {
            enabled: true,
            interval: Duration::from_secs(0),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_credentials_missing_key() {
        let api = ApiConfig {
            url: Some("https://ffa.example.com".to_string()),
            api_key: None,
        };
        let err = api.credentials("FFA").unwrap_err();
        assert!(err.to_string().contains("FFA API URL or API Key not configured"));
    }
}
