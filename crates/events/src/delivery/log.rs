//! Log-only mailer for development.

use async_trait::async_trait;

use super::email::EmailError;
use super::{Mailer, OutgoingEmail};

/// Writes each email to the log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "Email not sent (SMTP not configured)"
        );
        Ok(())
    }
}
