#![warn(missing_docs)]
//! Echowatch is a social-listening backend that monitors saved keyword alerts
//! and emails a digest whenever new matching content appears.

pub mod config;
pub mod http_server;
pub mod mailer;
pub mod models;
pub mod persistence;
pub mod scheduler;
pub mod search;
pub mod test_helpers;
