use alert_archive_core::config::{ArchiveConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use alert_archive_core::error::CoreResult;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "ALERT_ARCHIVE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

#[derive(Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Parent directory of the bucket directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    pub bucket: String,

    /// Optional key prefix shared by every object this service writes.
    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default = "default_source_base_url")]
    pub source_base_url: String,

    pub source_api_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_source_base_url() -> String {
    "https://app.threatstack.com/api/v2".to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

impl ServiceConfig {
    /// Reads `ALERT_ARCHIVE_*` variables, e.g. `ALERT_ARCHIVE_BUCKET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: Environment) -> Result<Self, ConfigError> {
        Config::builder().add_source(env).build()?.try_deserialize()
    }

    /// The validated, immutable subset handed to the core.
    pub fn archive_config(&self) -> CoreResult<ArchiveConfig> {
        ArchiveConfig::new(
            self.bucket.clone(),
            self.prefix.clone(),
            &self.source_base_url,
            self.source_api_key.clone(),
            self.request_timeout_secs,
        )
    }

    /// Directory backing the configured bucket.
    pub fn bucket_dir(&self) -> PathBuf {
        self.data_dir.join(&self.bucket)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("source_base_url", &self.source_base_url)
            .field("source_api_key", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}
