use serde::Deserialize;

/// Configuration for the SMTP relay that delivers digests.
#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    /// Hostname of the SMTP relay.
    pub host: String,

    /// Port of the SMTP relay.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Optional SMTP username; credentials are applied only when both
    /// username and password are set.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional SMTP password.
    #[serde(default)]
    pub password: Option<String>,

    /// The From address on every digest.
    pub from: String,

    /// Whether to connect over TLS.
    #[serde(default = "default_tls")]
    pub tls: bool,
}

/// Provides the default value for port.
fn default_port() -> u16 {
    587
}

/// Provides the default value for tls.
fn default_tls() -> bool {
    true
}
