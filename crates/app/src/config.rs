//! App configuration

use anyhow::{Context, Result};
use predictor_lib::predictor::{GatewayConfig, DEFAULT_MODEL_PATH};
use serde::Deserialize;
use std::path::PathBuf;

/// App configuration, read from `SALES_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Model artifact path, relative to the working directory
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA256 of the model file; unchecked when absent
    #[serde(default)]
    pub model_sha256: Option<String>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Instance name attached to structured log events
    #[serde(default = "default_instance")]
    pub instance: String,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_instance() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "sales-app".to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_sha256: None,
            host: default_host(),
            port: default_port(),
            instance: default_instance(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SALES"))
            .build()
            .context("Failed to read configuration")?;

        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("Invalid SALES_* configuration")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            model_path: self.model_path.clone(),
            expected_sha256: self.model_sha256.clone(),
            instance: self.instance.clone(),
        }
    }
}
