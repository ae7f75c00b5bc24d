//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (IMAGO_*)
//! 2. TOML config file (if IMAGO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (IMAGO_*)
/// 2. TOML config file (if IMAGO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key exchanged for an auth token at `{base_url}/auth`.
    ///
    /// Set via IMAGO_API_KEY environment variable.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the remote catalog API.
    ///
    /// Set via IMAGO_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Resource name under the base URL (`{base_url}/{resource}?page=N`).
    ///
    /// Set via IMAGO_RESOURCE environment variable.
    #[serde(default = "default_resource")]
    pub resource: String,

    /// Directory where downloaded assets are stored.
    ///
    /// Set via IMAGO_IMAGE_ROOT environment variable. Created on startup.
    #[serde(default = "default_image_root")]
    pub image_root: PathBuf,

    /// Seconds between background refresh cycles.
    ///
    /// Set via IMAGO_REFRESH_INTERVAL_SECS environment variable.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Maximum fetch attempts before a URL is reported unavailable.
    ///
    /// Set via IMAGO_MAX_RETRIES environment variable.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Buffer size in bytes for chunked asset writes.
    ///
    /// Set via IMAGO_CHUNK_SIZE environment variable.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum items processed concurrently within one page.
    ///
    /// Set via IMAGO_CONCURRENCY environment variable.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via IMAGO_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Socket address the search endpoint binds to.
    ///
    /// Set via IMAGO_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_base_url() -> String {
    "http://interview.agileengine.com".into()
}

fn default_resource() -> String {
    "images".into()
}

fn default_image_root() -> PathBuf {
    PathBuf::from("./images")
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_max_retries() -> u32 {
    5
}

fn default_chunk_size() -> usize {
    1024
}

fn default_concurrency() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            resource: default_resource(),
            image_root: default_image_root(),
            refresh_interval_secs: default_refresh_interval_secs(),
            max_retries: default_max_retries(),
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Refresh interval as Duration for the background scheduler.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// URL of the paginated resource endpoint.
    pub fn resource_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.resource)
    }

    /// URL of the auth token exchange endpoint.
    pub fn auth_url(&self) -> String {
        format!("{}/auth", self.base_url.trim_end_matches('/'))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `IMAGO_`
    /// 2. TOML file from `IMAGO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("IMAGO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("IMAGO_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
