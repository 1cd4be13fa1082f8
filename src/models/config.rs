//! Configuration model loaded from external sources.

use std::time::Duration;

use config::{Config, ConfigError};
use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    15
}

fn default_bulk_concurrency() -> usize {
    8
}

fn default_assets_dir() -> String {
    "./assets".to_string()
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    /// Root of the chapter REST backend, e.g. `https://api.isaca-sv.org/api/`.
    pub api_base_url: String,
    /// Bearer token forwarded on every backend request.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub api_timeout_secs: u64,
    /// Upper bound of concurrent backend calls issued by one bulk action.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,
    pub templates_dir: String,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    pub secret: String,
}

impl ServerConfig {
    /// Reads `{prefix}/default`, the optional `{prefix}/{app_env}` override
    /// and `APP_*` environment variables, in that order.
    pub fn load(path_prefix: &str, app_env: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name(&format!("{path_prefix}/default")))
            .add_source(
                config::File::with_name(&format!("{path_prefix}/{app_env}")).required(false),
            )
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs.max(1))
    }

    pub fn bulk_concurrency(&self) -> usize {
        self.bulk_concurrency.max(1)
    }
}
