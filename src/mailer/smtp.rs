//! SMTP implementation of the mail port.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    mailer::{Mailer, MailerError},
};

/// Delivers digests through an async SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Builds the SMTP transport from configuration. Credentials are applied
    /// only when both username and password are present.
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let mut builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| MailerError::Configuration(e.to_string()))?
                .port(config.port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host).port(config.port)
        };

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self { transport: builder.build(), from: config.from.clone() })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        let mut builder = Message::builder().from(self.from.parse()?).subject(subject);
        for recipient in recipients {
            builder = builder.to(recipient.trim().parse()?);
        }
        let email = builder.header(ContentType::TEXT_HTML).body(html_body.to_string())?;

        self.transport.send(email).await?;
        tracing::info!(recipients = recipients.len(), "Digest email delivered.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 25,
            username: None,
            password: None,
            from: "alerts@example.com".to_string(),
            tls: false,
        }
    }

    #[test]
    fn test_mailer_construction() {
        assert!(SmtpMailer::new(&config()).is_ok());
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_recipient() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        let result =
            mailer.send(&["not an address".to_string()], "subject", "<p>body</p>").await;
        assert!(matches!(result, Err(MailerError::Address(_))));
    }
}
