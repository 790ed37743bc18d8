//! Ticket issuance: capacity reservation, ticket creation, and the
//! post-commit notification hand-off, composed over the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CustomTicketType, Ticket, User};
use crate::notify::TicketNotification;
use crate::state::AppState;
use crate::store;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketRequest {
    pub event_id: Uuid,
    #[serde(default)]
    pub ticket_type_id: Option<Uuid>,
    pub recipient_name: String,
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    #[serde(default)]
    pub ticket_bg_image: Option<String>,
    #[serde(default)]
    pub custom_ticket_type: Option<CustomTicketType>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTicket {
    pub id: Uuid,
    pub ticket_number: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub ticket_type: String,
    pub event_name: String,
    pub created_at: DateTime<Utc>,
}

/// Issues one ticket. Event lookup, type resolution, capacity reservation and
/// the insert commit together; the notification is handed off afterwards and
/// cannot fail the issuance.
pub async fn issue_ticket(
    state: &AppState,
    issuer: &User,
    request: IssueTicketRequest,
) -> Result<IssuedTicket, AppError> {
    validate(&request)?;

    let mut tx = state.pool.begin().await?;

    let event = store::events::get(&mut *tx, request.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let ticket_type = match &request.custom_ticket_type {
        Some(custom) => {
            let created = store::ticket_types::create_custom(
                &mut tx,
                event.id,
                &custom.name,
                custom.description.as_deref(),
            )
            .await?;
            store::ticket_types::reserve(&mut tx, created.id).await?
        }
        None => {
            let type_id = request
                .ticket_type_id
                .ok_or_else(|| AppError::ValidationError("Missing required fields".to_string()))?;
            store::ticket_types::reserve(&mut tx, type_id).await?
        }
    };

    let ticket_number = generate_ticket_number();
    let qr_code = redemption_code(&ticket_number, event.id, &request.recipient_email);

    let ticket = store::tickets::insert(
        &mut tx,
        store::tickets::NewTicket {
            event_id: event.id,
            ticket_type_id: ticket_type.id,
            qr_code: &qr_code,
            ticket_number: &ticket_number,
            recipient_name: &request.recipient_name,
            recipient_email: &request.recipient_email,
            recipient_phone: request.recipient_phone.as_deref(),
            ticket_bg_image: request.ticket_bg_image.as_deref(),
            created_by: issuer.id,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        ticket_number = %ticket.ticket_number,
        event = %event.name,
        issuer = %issuer.id,
        "Ticket issued"
    );

    let issued = IssuedTicket {
        id: ticket.id,
        ticket_number: ticket.ticket_number.clone(),
        recipient_name: ticket.recipient_name.clone(),
        recipient_email: ticket.recipient_email.clone(),
        ticket_type: ticket_type.name.clone(),
        event_name: event.name.clone(),
        created_at: ticket.created_at,
    };

    dispatch_notification(state, &ticket, &event.name, event.event_date, &event.location, &ticket_type.name);

    Ok(issued)
}

/// Fire-and-forget delivery. Success flips `email_sent`; failure only logs
/// and leaves the ticket eligible for resend.
fn dispatch_notification(
    state: &AppState,
    ticket: &Ticket,
    event_name: &str,
    event_date: DateTime<Utc>,
    event_location: &str,
    ticket_type: &str,
) {
    let notification = TicketNotification {
        recipient_email: ticket.recipient_email.clone(),
        recipient_name: ticket.recipient_name.clone(),
        event_name: event_name.to_string(),
        event_date: event_date.to_rfc3339(),
        event_location: event_location.to_string(),
        ticket_number: ticket.ticket_number.clone(),
        ticket_type: ticket_type.to_string(),
        qr_payload: ticket.qr_code.clone(),
    };

    let state = state.clone();
    let ticket_id = ticket.id;

    tokio::spawn(async move {
        match state.notifier.send_ticket(&notification).await {
            Ok(()) => {
                if let Err(e) = store::tickets::mark_email_sent(&state.pool, ticket_id).await {
                    tracing::error!(error = ?e, %ticket_id, "Failed to record notification delivery");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, %ticket_id, "Ticket notification failed, resend available");
            }
        }
    });
}

fn validate(request: &IssueTicketRequest) -> Result<(), AppError> {
    if request.recipient_name.trim().is_empty() || request.recipient_email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Missing required fields".to_string(),
        ));
    }
    if request.ticket_type_id.is_none() && request.custom_ticket_type.is_none() {
        return Err(AppError::ValidationError(
            "Either ticketTypeId or customTicketType is required".to_string(),
        ));
    }
    Ok(())
}

pub fn generate_ticket_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TKT-{}", hex[..8].to_uppercase())
}

/// Deterministic composite of identifiers already bound to the ticket, so a
/// resend reproduces the same code instead of re-issuing.
pub fn redemption_code(ticket_number: &str, event_id: Uuid, recipient_email: &str) -> String {
    format!("{ticket_number}|{event_id}|{recipient_email}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_number_format() {
        let number = generate_ticket_number();
        assert!(number.starts_with("TKT-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_ticket_numbers_are_distinct() {
        assert_ne!(generate_ticket_number(), generate_ticket_number());
    }

    #[test]
    fn test_redemption_code_is_deterministic() {
        let event_id = Uuid::new_v4();
        let a = redemption_code("TKT-AB12CD34", event_id, "guest@example.com");
        let b = redemption_code("TKT-AB12CD34", event_id, "guest@example.com");
        assert_eq!(a, b);
        assert_eq!(a, format!("TKT-AB12CD34|{event_id}|guest@example.com"));
    }

    #[test]
    fn test_validation_requires_a_type() {
        let request = IssueTicketRequest {
            event_id: Uuid::new_v4(),
            ticket_type_id: None,
            recipient_name: "Ada".to_string(),
            recipient_email: "ada@example.com".to_string(),
            recipient_phone: None,
            ticket_bg_image: None,
            custom_ticket_type: None,
        };
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_validation_rejects_blank_recipient() {
        let request = IssueTicketRequest {
            event_id: Uuid::new_v4(),
            ticket_type_id: Some(Uuid::new_v4()),
            recipient_name: "  ".to_string(),
            recipient_email: "ada@example.com".to_string(),
            recipient_phone: None,
            ticket_bg_image: None,
            custom_ticket_type: None,
        };
        assert!(validate(&request).is_err());
    }
}
