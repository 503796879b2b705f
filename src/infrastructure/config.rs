use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::DomainError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub elasticsearch: Option<ElasticsearchConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElasticsearchConfig {
    pub host: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default)]
    pub api: ApiFlavor,
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl ElasticsearchConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            index: default_index(),
            api: ApiFlavor::default(),
            request_timeout_seconds: None,
        }
    }
}

/// Which REST layout the cluster speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    /// Elasticsearch 7 and later: `_doc` endpoints, no mapping types.
    #[default]
    Typeless,
    /// Elasticsearch 6 and earlier: the model's type is part of every path.
    Typed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_index() -> String {
    "app".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Reads `CONFIG_PATH` (or the default path when it exists), then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").ok();
        let mut config = match path.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("ELASTICSEARCH_HOST") {
            match self.elasticsearch.as_mut() {
                Some(es) => es.host = host,
                None => self.elasticsearch = Some(ElasticsearchConfig::new(host)),
            }
        }

        if let Some(index) = lookup("ELASTICSEARCH_INDEX") {
            if let Some(es) = self.elasticsearch.as_mut() {
                es.index = index;
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "SERVER_PORT".to_string(),
                value: port,
            })?;
        }

        Ok(())
    }

    /// The store section. Its absence is fatal for anything that needs a store.
    pub fn elasticsearch(&self) -> Result<&ElasticsearchConfig, DomainError> {
        self.elasticsearch.as_ref().ok_or_else(|| {
            tracing::error!("Can not init elasticsearch, no valid config");
            DomainError::initialization("missing elasticsearch configuration section")
        })
    }
}
