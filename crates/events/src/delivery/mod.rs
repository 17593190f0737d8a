//! Email delivery backends.
//!
//! [`Mailer`] is the seam between notification rendering and transport.
//! [`email::SmtpMailer`] sends over SMTP; [`log::LogMailer`] only logs and is
//! used when SMTP is not configured.

pub mod email;
pub mod log;

use async_trait::async_trait;

use crate::delivery::email::EmailError;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}
