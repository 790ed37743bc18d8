use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub quantity_issued: i32,
    pub is_custom: bool,
    pub description: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub qr_code: String,
    pub ticket_number: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: Option<String>,
    pub ticket_bg_image: Option<String>,
    pub status: String,
    pub email_sent: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket joined with its event and type context, the shape the scan path
/// and resend read.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketDetails {
    pub id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub qr_code: String,
    pub ticket_number: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: Option<String>,
    pub status: String,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub event_location: String,
    pub ticket_type_name: String,
}

/// Row for per-event ticket listings, carrying check-in provenance when the
/// ticket has been redeemed.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketWithCheckIn {
    pub id: Uuid,
    pub ticket_number: String,
    pub qr_code: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub recipient_phone: Option<String>,
    pub status: String,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub ticket_type_name: String,
    pub check_in_time: Option<DateTime<Utc>>,
    pub scanner_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Active => "active",
            TicketStatus::Used => "used",
            TicketStatus::Cancelled => "cancelled",
        }
    }
}

/// Inline ticket-type definition for one-off, uncapped allocations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTicketType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub status: Option<TicketStatus>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.recipient_name.is_none()
            && self.recipient_email.is_none()
            && self.recipient_phone.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTypePatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
}

impl TicketTypePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ticket_patch_detected() {
        assert!(TicketPatch::default().is_empty());
    }

    #[test]
    fn test_status_patch_parses_camel_case_payload() {
        let patch: TicketPatch = serde_json::from_str(r#"{"status":"cancelled"}"#).unwrap();
        assert_eq!(patch.status, Some(TicketStatus::Cancelled));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_recipient_fields_use_camel_case() {
        let patch: TicketPatch =
            serde_json::from_str(r#"{"recipientName":"Ada","recipientPhone":"555"}"#).unwrap();
        assert_eq!(patch.recipient_name.as_deref(), Some("Ada"));
        assert_eq!(patch.recipient_phone.as_deref(), Some("555"));
    }
}
