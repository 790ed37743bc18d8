use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub status: String,
    pub banner_image: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row joined with its ticket statistics, as returned by list/detail queries.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub status: String,
    pub banner_image: Option<String>,
    pub created_by_name: Option<String>,
    pub total_tickets_issued: i64,
    pub tickets_used: i64,
    pub tickets_active: i64,
    pub tickets_cancelled: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle: draft -> active -> closed, forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Closed,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Active => "active",
            EventStatus::Closed => "closed",
        }
    }

    /// The only state this status may be entered from.
    pub fn predecessor(self) -> Option<EventStatus> {
        match self {
            EventStatus::Draft => None,
            EventStatus::Active => Some(EventStatus::Draft),
            EventStatus::Closed => Some(EventStatus::Active),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub banner_image: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.banner_image.is_none()
            && self.event_date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_detected() {
        assert!(EventPatch::default().is_empty());
    }

    #[test]
    fn test_patch_with_field_not_empty() {
        let patch = EventPatch {
            location: Some("Main Hall".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_status_progression_is_forward_only() {
        assert_eq!(EventStatus::Active.predecessor(), Some(EventStatus::Draft));
        assert_eq!(EventStatus::Closed.predecessor(), Some(EventStatus::Active));
        assert_eq!(EventStatus::Draft.predecessor(), None);
    }
}
