use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::helpers::deserialize_duration_from_seconds;

/// Configuration for the content search backend.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Base URL of the search backend.
    pub base_url: Url,

    /// Index holding the listened content.
    pub index: String,

    /// Per-request timeout in seconds.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        default = "default_timeout"
    )]
    pub timeout: Duration,
}

/// Provides the default value for timeout.
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
