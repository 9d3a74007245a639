use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::assessment::ScoringConfig;
use crate::hazards::{DataLoadError, HazardStore};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = LogFormat::from_str(&env::var("APP_LOG_FORMAT").unwrap_or_default());

        let hazard_dataset = optional_path("HAZARD_DATASET_PATH");
        let scoring_rules = optional_path("SCORING_CONFIG_PATH");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            data: DataConfig {
                hazard_dataset,
                scoring_rules,
            },
        })
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Output layout of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Locations of the reference data consumed at startup.
#[derive(Debug, Clone, Default)]
pub struct DataConfig {
    /// Hazard table (`.json` or `.csv`); the bundled table is used when unset.
    pub hazard_dataset: Option<PathBuf>,
    /// JSON overrides for the scoring weights.
    pub scoring_rules: Option<PathBuf>,
}

impl DataConfig {
    pub fn hazard_store(&self) -> Result<HazardStore, DataLoadError> {
        match &self.hazard_dataset {
            Some(path) => HazardStore::from_path(path),
            None => HazardStore::builtin(),
        }
    }

    pub fn scoring_config(&self) -> Result<ScoringConfig, ConfigError> {
        let Some(path) = &self.scoring_rules else {
            return Ok(ScoringConfig::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ScoringRulesIo {
            path: path.clone(),
            source,
        })?;
        let config: ScoringConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ScoringRulesFormat {
                path: path.clone(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    ScoringRulesIo {
        path: PathBuf,
        source: std::io::Error,
    },
    ScoringRulesFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidScoringRules {
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::ScoringRulesIo { path, .. } => {
                write!(f, "unable to read scoring rules at {}", path.display())
            }
            ConfigError::ScoringRulesFormat { path, .. } => {
                write!(f, "scoring rules at {} are not valid JSON", path.display())
            }
            ConfigError::InvalidScoringRules { reason } => {
                write!(f, "scoring rules rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidScoringRules { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ScoringRulesIo { source, .. } => Some(source),
            ConfigError::ScoringRulesFormat { source, .. } => Some(source),
        }
    }
}
