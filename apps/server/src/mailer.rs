//! Outgoing mail.
//!
//! Messages are written to the tracing output. SMTP settings are carried so
//! deployments can see which relay a message would have used.

use async_trait::async_trait;
use eventcover_core::{
    notifications::{EmailMessage, Mailer},
    Result,
};

use crate::config::SmtpConfig;

pub struct TracingMailer {
    smtp: SmtpConfig,
}

impl TracingMailer {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            relay = self.smtp.host.as_deref().unwrap_or("none"),
            "Outgoing email\n{}",
            message.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_succeeds() {
        let mailer = TracingMailer::new(SmtpConfig::default());
        mailer
            .send(EmailMessage {
                to: "ops@example.com".to_string(),
                subject: "Error report".to_string(),
                body: "CRITICAL: 1".to_string(),
            })
            .await
            .unwrap();
    }
}
