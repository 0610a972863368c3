use std::path::Path;

use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

use crate::backend::{DEFAULT_SCHEMA_CACHE_CAPACITY, DEFAULT_SCHEMA_CACHE_TTL};
use crate::datetime::{DateTimeFormat, DEFAULT_DISPLAY_FORMAT, DEFAULT_STORAGE_FORMAT};

pub const DEFAULT_CONFIG_PATH: &str = "recordform.toml";

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct RecordformConfig {
    pub backend: Backend,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub datetime: DateTime,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Backend {
    #[cfg(feature = "backend-http")]
    Http(Http),
    Memory(Memory),
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Http {
    pub url: String,
    pub user_agent: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct Memory {
    /// JSON file with `{db: {table: {name, schema, rows, actions}}}`
    pub fixture: Option<String>,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Cache {
    pub schema_capacity: u64,
    pub schema_ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            schema_capacity: DEFAULT_SCHEMA_CACHE_CAPACITY,
            schema_ttl_secs: DEFAULT_SCHEMA_CACHE_TTL.as_secs(),
        }
    }
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct DateTime {
    pub storage_format: String,
    pub display_format: String,
}

impl Default for DateTime {
    fn default() -> Self {
        Self {
            storage_format: DEFAULT_STORAGE_FORMAT.to_string(),
            display_format: DEFAULT_DISPLAY_FORMAT.to_string(),
        }
    }
}

impl DateTime {
    pub fn format(&self) -> DateTimeFormat {
        DateTimeFormat::new(&self.storage_format, &self.display_format)
    }
}

fn validate_backend(backend: &Backend) -> Result<(), ConfigError> {
    match backend {
        #[cfg(feature = "backend-http")]
        Backend::Http(Http { url, .. }) => url::Url::parse(url).map(|_| ()).map_err(|e| {
            ConfigError::Message(format!("Invalid backend URL {url:?}: {e}"))
        }),
        Backend::Memory(_) => Ok(()),
    }
}

pub fn validate_config(config: RecordformConfig) -> Result<RecordformConfig, ConfigError> {
    validate_backend(&config.backend)?;

    if config.cache.schema_capacity == 0 {
        return Err(ConfigError::Message(
            "cache.schema_capacity must be greater than 0".to_string(),
        ));
    }

    config
        .datetime
        .format()
        .validate()
        .map_err(|e| ConfigError::Message(e.to_string()))?;

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<RecordformConfig, ConfigError> {
    let path = path.to_str().ok_or_else(|| {
        ConfigError::Message(format!("Config path {path:?} isn't valid UTF-8"))
    })?;
    let config = Config::builder().add_source(File::with_name(path));

    config.build()?.try_deserialize().and_then(validate_config)
}

// Load a config from a string (to test our structs are defined correctly)
pub fn load_config_from_string(
    config_str: &str,
    skip_validation: bool,
) -> Result<RecordformConfig, ConfigError> {
    let config =
        Config::builder().add_source(File::from_str(config_str, FileFormat::Toml));

    if skip_validation {
        config.build()?.try_deserialize()
    } else {
        config.build()?.try_deserialize().and_then(validate_config)
    }
}
