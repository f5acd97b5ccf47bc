use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{
    helpers::deserialize_duration_from_seconds, SearchConfig, ServerConfig, SmtpConfig,
};

/// Provides the default value for shutdown_timeout.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for external_call_timeout.
fn default_external_call_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Application configuration for the alert monitor.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Database URL for the SQLite database.
    pub database_url: String,

    /// Content search backend configuration.
    pub search: SearchConfig,

    /// SMTP relay configuration.
    pub smtp: SmtpConfig,

    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,

    /// Upper bound in seconds on each external search or mail call made
    /// during a tick.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_external_call_timeout"
    )]
    pub external_call_timeout: Duration,
}

impl AppConfig {
    /// Loads the configuration from an optional file merged with
    /// `ECHOWATCH_`-prefixed environment variables.
    pub fn new(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(|| "echowatch".into());

        let config = Config::builder()
            .add_source(File::from(path.as_path()).required(false))
            .add_source(Environment::with_prefix("ECHOWATCH").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
