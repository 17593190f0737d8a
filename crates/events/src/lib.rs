//! Domain event bus and applicant/employee notifications.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the event envelope published by the API.
//! - [`notices`] -- typed payloads carried by notification events.
//! - [`templates`] -- renders a notification event into an email.
//! - [`delivery`] -- the [`Mailer`] trait with SMTP and log-only backends.
//! - [`Notifier`] -- background task turning events into emails.

pub mod bus;
pub mod delivery;
pub mod notices;
pub mod notifier;
pub mod templates;

pub use bus::{event_types, DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, EmailError, SmtpMailer};
pub use delivery::log::LogMailer;
pub use delivery::{Mailer, OutgoingEmail};
pub use notifier::Notifier;
