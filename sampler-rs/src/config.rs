use std::time::Duration;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CLIENT_TIMEOUT_SECS, DEFAULT_COLLECTION_DURATION_MS, DEFAULT_UPDATE_INTERVAL_MS,
};
use crate::errors::SamplerError;

const CONFIG_FILE: &str = "sampler_config";
const ENV_PREFIX: &str = "SAMPLER";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timing of a sampling session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    #[serde(default = "default_collection_duration_ms")]
    pub collection_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Endpoint the collected batch is posted to. Nothing is uploaded when unset.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base url of the phyphox REST API. Simulated sensors are used when unset.
    #[serde(default)]
    pub phyphox_url: Option<String>,
    #[serde(default = "default_add_sensor_noise")]
    pub add_sensor_noise: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

fn default_collection_duration_ms() -> u64 {
    DEFAULT_COLLECTION_DURATION_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_CLIENT_TIMEOUT_SECS
}

fn default_add_sensor_noise() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            collection_duration_ms: default_collection_duration_ms(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            phyphox_url: None,
            add_sensor_noise: default_add_sensor_noise(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SessionConfig {
    pub fn new(update_interval_ms: u64, collection_duration_ms: u64) -> Result<Self, SamplerError> {
        let config = Self {
            update_interval_ms,
            collection_duration_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.update_interval_ms == 0 {
            return Err(SamplerError::InvalidConfig(
                "update_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.collection_duration_ms == 0 {
            return Err(SamplerError::InvalidConfig(
                "collection_duration_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn collection_duration(&self) -> Duration {
        Duration::from_millis(self.collection_duration_ms)
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SamplerConfig {
    /// Loads defaults, then `sampler_config.{toml,json,...}` if present, then `SAMPLER_*`
    /// environment variables (`SAMPLER_UPLOAD__URL`, `SAMPLER_SESSION__UPDATE_INTERVAL_MS`...).
    pub fn load() -> Result<Self, SamplerError> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    /// Parses a configuration document. Missing fields take their defaults.
    pub fn parse(contents: &str, format: FileFormat) -> Result<Self, SamplerError> {
        let config = Config::builder()
            .add_source(File::from_str(contents, format))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, SamplerError> {
        let sampler_config: SamplerConfig = config.try_deserialize()?;
        sampler_config.session.validate()?;
        Ok(sampler_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SamplerConfig::default();
        assert_eq!(config.session.update_interval(), Duration::from_millis(1000));
        assert_eq!(
            config.session.collection_duration(),
            Duration::from_millis(10000)
        );
        assert!(config.upload.url.is_none());
        assert_eq!(config.upload.timeout(), Duration::from_secs(5));
        assert!(config.source.phyphox_url.is_none());
        assert!(config.source.add_sensor_noise);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let contents = r#"
            [session]
            update_interval_ms = 250

            [upload]
            url = "http://localhost:3000/create"
        "#;
        let config = SamplerConfig::parse(contents, FileFormat::Toml).unwrap();
        assert_eq!(config.session.update_interval_ms, 250);
        assert_eq!(config.session.collection_duration_ms, 10000);
        assert_eq!(
            config.upload.url.as_deref(),
            Some("http://localhost:3000/create")
        );
        assert_eq!(config.upload.timeout_secs, 5);
    }

    #[test]
    fn test_parse_empty_document() {
        let config = SamplerConfig::parse("", FileFormat::Toml).unwrap();
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_parse_rejects_zero_interval() {
        let contents = r#"
            [session]
            update_interval_ms = 0
        "#;
        let result = SamplerConfig::parse(contents, FileFormat::Toml);
        assert!(matches!(result, Err(SamplerError::InvalidConfig(_))));
    }

    #[test]
    fn test_session_config_new() {
        assert!(SessionConfig::new(1000, 10000).is_ok());
        assert!(matches!(
            SessionConfig::new(1000, 0),
            Err(SamplerError::InvalidConfig(_))
        ));
        assert!(matches!(
            SessionConfig::new(0, 10000),
            Err(SamplerError::InvalidConfig(_))
        ));
    }
}
