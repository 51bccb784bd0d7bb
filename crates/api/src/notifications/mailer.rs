//! Email notification consumer.
//!
//! Subscribes to the event bus, resolves each event's recipient to an
//! email address, and hands the message to the SMTP delivery channel.
//! Delivery failures are logged and never propagate back to the request
//! path that published the event.

use atelier_db::repositories::UserRepo;
use atelier_db::DbPool;
use atelier_events::delivery::{EmailConfig, EmailDelivery};
use atelier_events::PlatformEvent;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub struct NotificationMailer {
    pool: DbPool,
    delivery: Option<EmailDelivery>,
}

impl NotificationMailer {
    /// Build the mailer from the environment. Without `SMTP_HOST` the
    /// consumer still drains the bus but only logs each notification.
    pub fn new(pool: DbPool) -> Self {
        let delivery = EmailConfig::from_env().map(EmailDelivery::new);
        if delivery.is_none() {
            tracing::info!("SMTP not configured, notification emails disabled");
        }
        Self { pool, delivery }
    }

    /// Consume events until the bus closes.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        tracing::info!("notification mailer started");
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(err) = self.handle_event(&event).await {
                        tracing::error!(
                            event_type = %event.event_type,
                            error = %err,
                            "failed to deliver notification"
                        );
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification mailer lagged behind the event bus");
                }
                Err(RecvError::Closed) => {
                    tracing::info!("event bus closed, notification mailer stopping");
                    break;
                }
            }
        }
    }

    async fn handle_event(&self, event: &PlatformEvent) -> Result<(), HandlerError> {
        // Events without a recipient are audit-only.
        let Some(recipient_id) = event.recipient_user_id else {
            return Ok(());
        };

        let Some(user) = UserRepo::find_by_id(&self.pool, recipient_id).await? else {
            tracing::warn!(recipient_id, "notification recipient not found");
            return Ok(());
        };

        match &self.delivery {
            Some(delivery) => delivery.deliver(&user.email, event).await?,
            None => {
                tracing::debug!(
                    event_type = %event.event_type,
                    recipient = %user.email,
                    "notification suppressed, SMTP not configured"
                );
            }
        }

        Ok(())
    }
}
