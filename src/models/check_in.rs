use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable record of a successful redemption. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub scanner_id: Uuid,
    pub check_in_time: DateTime<Utc>,
}

/// Check-in joined with ticket and event context for scan history listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CheckInRecord {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub scanner_id: Uuid,
    pub check_in_time: DateTime<Utc>,
    pub ticket_number: String,
    pub recipient_name: String,
    pub event_name: String,
    pub ticket_type_name: String,
}
