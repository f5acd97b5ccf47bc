//! Application configuration, loaded from a file plus environment overrides.

mod app_config;
mod helpers;
mod search;
mod server;
mod smtp;

pub use app_config::AppConfig;
pub use helpers::{deserialize_duration_from_seconds, serialize_duration_to_seconds};
pub use search::SearchConfig;
pub use server::ServerConfig;
pub use smtp::SmtpConfig;
