use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::SendGridConfig;

/// Delivery is capped so a slow provider can never hold up anything upstream.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Everything the notification sink needs to deliver a ticket to its
/// recipient. The QR payload is the rendered artifact; visual rendering is the
/// client's concern.
#[derive(Debug, Clone)]
pub struct TicketNotification {
    pub recipient_email: String,
    pub recipient_name: String,
    pub event_name: String,
    pub event_date: String,
    pub event_location: String,
    pub ticket_number: String,
    pub ticket_type: String,
    pub qr_payload: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification sink not configured")]
    NotConfigured,

    #[error("notification request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("notification sink rejected the message: status {0}")]
    Rejected(u16),
}

/// Best-effort notification sink. Implementations must never be invoked from
/// inside a store transaction.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_ticket(&self, notification: &TicketNotification) -> Result<(), NotifyError>;
}

/// SendGrid-backed notifier. Failures are reported, never retried here; the
/// resend endpoint is the retry path.
pub struct SendGridNotifier {
    client: reqwest::Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridNotifier {
    pub fn new(config: SendGridConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("Failed to build notification HTTP client");

        Self {
            client,
            api_key: config.api_key,
            from_email: config.from_email,
            from_name: config.from_name,
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send_ticket(&self, notification: &TicketNotification) -> Result<(), NotifyError> {
        let body = json!({
            "personalizations": [{
                "to": [{
                    "email": notification.recipient_email,
                    "name": notification.recipient_name,
                }],
                "subject": format!("Your ticket for {}", notification.event_name),
            }],
            "from": {
                "email": self.from_email,
                "name": self.from_name,
            },
            "content": [{
                "type": "text/plain",
                "value": format!(
                    "Hi {},\n\nYour ticket for {} has been issued.\n\n\
                     Ticket: {}\nType: {}\nDate: {}\nLocation: {}\n\n\
                     Present this code at the entrance:\n{}\n\n\
                     Each ticket can only be used once. Do not share your code.",
                    notification.recipient_name,
                    notification.event_name,
                    notification.ticket_number,
                    notification.ticket_type,
                    notification.event_date,
                    notification.event_location,
                    notification.qr_payload,
                ),
            }],
        });

        tracing::info!(recipient = %notification.recipient_email, "Sending ticket notification");

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            tracing::info!(recipient = %notification.recipient_email, "Ticket notification sent");
            Ok(())
        } else {
            tracing::error!(
                status = %response.status(),
                recipient = %notification.recipient_email,
                "Notification sink rejected the message"
            );
            Err(NotifyError::Rejected(response.status().as_u16()))
        }
    }
}

/// Used when no sink is configured; tickets are still issued, with
/// `email_sent` left false for a later resend.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send_ticket(&self, notification: &TicketNotification) -> Result<(), NotifyError> {
        tracing::warn!(
            recipient = %notification.recipient_email,
            ticket = %notification.ticket_number,
            "Notification sink not configured, skipping delivery"
        );
        Err(NotifyError::NotConfigured)
    }
}
