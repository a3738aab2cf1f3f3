use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_MONGODB_DB: &str = "college";
const DEFAULT_MONGODB_COLLECTION: &str = "students";
const DEFAULT_SERVER_PORT: u16 = 8081;
const DEFAULT_METRICS_PORT: u16 = 8000;
const DEFAULT_LOG_FILE: &str = "logs/student-registry.log";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Configuration was installed more than once.
    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

/// Runtime configuration for the student registry.
#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string of the MongoDB deployment holding student documents.
    pub mongodb_url: String,
    /// Database containing the student collection.
    pub mongodb_db: String,
    /// Collection that stores one document per student.
    pub mongodb_collection: String,
    /// Port the HTTP API listens on.
    pub server_port: u16,
    /// Port the Prometheus scrape endpoint listens on.
    pub metrics_port: u16,
    /// File that receives a copy of every log line, appended across restarts.
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let port = |key: &str, default: u16| {
            optional(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
                })
                .transpose()
                .map(|value| value.unwrap_or(default))
        };

        Ok(Self {
            mongodb_url: optional("MONGODB_URL")
                .ok_or_else(|| ConfigError::MissingVariable("MONGODB_URL".to_string()))?,
            mongodb_db: optional("MONGODB_DB").unwrap_or_else(|| DEFAULT_MONGODB_DB.to_string()),
            mongodb_collection: optional("MONGODB_COLLECTION")
                .unwrap_or_else(|| DEFAULT_MONGODB_COLLECTION.to_string()),
            server_port: port("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            metrics_port: port("METRICS_PORT", DEFAULT_METRICS_PORT)?,
            log_file: optional("STUDENTS_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment (and `.env`, when present) into the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        database = %config.mongodb_db,
        collection = %config.mongodb_collection,
        server_port = config.server_port,
        metrics_port = config.metrics_port,
        log_file = %config.log_file.display(),
        "Loaded configuration"
    );
    CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    Ok(get_config())
}
