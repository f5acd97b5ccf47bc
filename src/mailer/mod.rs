//! The mail port: delivers the HTML digest to an alert's recipients.

pub mod digest;
pub mod smtp;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Errors that can occur while building or delivering a digest email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// A recipient or sender address could not be parsed.
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("Failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP transport rejected or failed to deliver the message.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The transport could not be constructed from configuration.
    #[error("Invalid mailer configuration: {0}")]
    Configuration(String),
}

/// Sends an HTML digest to a list of recipients.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one digest. Recipients are trimmed email addresses.
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError>;
}
