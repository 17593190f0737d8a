//! Background notification service.
//!
//! [`Notifier`] subscribes to the [`EventBus`](crate::bus::EventBus), renders
//! each notification event and hands it to a [`Mailer`]. Delivery failures
//! are logged and never reach the request that published the event.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::DomainEvent;
use crate::delivery::Mailer;
use crate::templates;

pub struct Notifier;

impl Notifier {
    /// Run until the bus is dropped.
    pub async fn run(mailer: Arc<dyn Mailer>, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => Self::handle(mailer.as_ref(), &event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notifier lagged, some emails were not sent");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notifier shutting down");
                    break;
                }
            }
        }
    }

    /// Render and send the email for one event, if it has one.
    pub async fn handle(mailer: &dyn Mailer, event: &DomainEvent) {
        let Some(email) = templates::render(event) else {
            return;
        };
        if let Err(e) = mailer.send(&email).await {
            tracing::warn!(
                error = %e,
                event_type = %event.event_type,
                to = %email.to,
                "Failed to send notification email"
            );
        }
    }
}
