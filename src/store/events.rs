//! Event catalog: CRUD, statistics, and the dependency-ordered cascade
//! delete.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Event, EventPatch, EventStatus, EventSummary};
use crate::utils::error::AppError;

/// Every new event starts with the house ticket tiers; organizers adjust or
/// extend them afterwards.
const DEFAULT_TICKET_TYPES: &[(&str, i64, i32)] = &[
    ("Early bird", 50, 100),
    ("Late bird", 80, 50),
    ("VIP", 150, 30),
    ("Table for 4", 300, 10),
    ("Table for 8", 500, 5),
];

pub struct NewEvent<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub banner_image: Option<&'a str>,
    pub event_date: DateTime<Utc>,
    pub location: &'a str,
    pub capacity: i32,
    pub created_by: Uuid,
}

/// Creates the event and its default ticket types in one transaction.
pub async fn create(pool: &PgPool, new: NewEvent<'_>) -> Result<Event, AppError> {
    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (created_by, name, description, banner_image, event_date, location, capacity, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft')
        RETURNING *
        "#,
    )
    .bind(new.created_by)
    .bind(new.name)
    .bind(new.description)
    .bind(new.banner_image)
    .bind(new.event_date)
    .bind(new.location)
    .bind(new.capacity)
    .fetch_one(&mut *tx)
    .await?;

    for (name, price, quantity) in DEFAULT_TICKET_TYPES {
        sqlx::query(
            r#"
            INSERT INTO ticket_types (event_id, name, price, quantity, quantity_issued)
            VALUES ($1, $2, $3, $4, 0)
            "#,
        )
        .bind(event.id)
        .bind(name)
        .bind(Decimal::from(*price))
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(event)
}

pub async fn get<'e>(
    executor: impl PgExecutor<'e>,
    event_id: Uuid,
) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(executor)
        .await?;

    Ok(event)
}

pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<EventSummary>, AppError> {
    let mut query = String::from(
        r#"
        SELECT e.id, e.name, e.description, e.event_date, e.location, e.capacity,
               e.status, e.banner_image, e.created_at, e.updated_at,
               u.full_name AS created_by_name,
               COUNT(DISTINCT t.id) AS total_tickets_issued,
               COUNT(DISTINCT CASE WHEN t.status = 'used' THEN t.id END) AS tickets_used,
               COUNT(DISTINCT CASE WHEN t.status = 'active' THEN t.id END) AS tickets_active,
               COUNT(DISTINCT CASE WHEN t.status = 'cancelled' THEN t.id END) AS tickets_cancelled
        FROM events e
        LEFT JOIN users u ON e.created_by = u.id
        LEFT JOIN tickets t ON e.id = t.event_id
        "#,
    );

    if status.is_some() {
        query.push_str(" WHERE e.status = $1");
    }
    query.push_str(" GROUP BY e.id, u.full_name ORDER BY e.event_date DESC");

    let mut q = sqlx::query_as::<_, EventSummary>(&query);
    if let Some(status) = status {
        q = q.bind(status);
    }

    let events = q.fetch_all(pool).await?;

    Ok(events)
}

pub async fn summary(pool: &PgPool, event_id: Uuid) -> Result<Option<EventSummary>, AppError> {
    let event = sqlx::query_as::<_, EventSummary>(
        r#"
        SELECT e.id, e.name, e.description, e.event_date, e.location, e.capacity,
               e.status, e.banner_image, e.created_at, e.updated_at,
               u.full_name AS created_by_name,
               COUNT(DISTINCT t.id) AS total_tickets_issued,
               COUNT(DISTINCT CASE WHEN t.status = 'used' THEN t.id END) AS tickets_used,
               COUNT(DISTINCT CASE WHEN t.status = 'active' THEN t.id END) AS tickets_active,
               COUNT(DISTINCT CASE WHEN t.status = 'cancelled' THEN t.id END) AS tickets_cancelled
        FROM events e
        LEFT JOIN users u ON e.created_by = u.id
        LEFT JOIN tickets t ON e.id = t.event_id
        WHERE e.id = $1
        GROUP BY e.id, u.full_name
        "#,
    )
    .bind(event_id)
    .fetch_optional(pool)
    .await?;

    Ok(event)
}

pub async fn update(
    pool: &PgPool,
    event_id: Uuid,
    patch: &EventPatch,
) -> Result<Option<Event>, AppError> {
    let updated = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            banner_image = COALESCE($4, banner_image),
            event_date = COALESCE($5, event_date),
            location = COALESCE($6, location),
            capacity = COALESCE($7, capacity),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(patch.name.as_deref())
    .bind(patch.description.as_deref())
    .bind(patch.banner_image.as_deref())
    .bind(patch.event_date)
    .bind(patch.location.as_deref())
    .bind(patch.capacity)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

/// Moves an event forward in its lifecycle. The expected-state predicate
/// makes the progression one-way; repeating a transition is a conflict, not
/// a rewind.
pub async fn transition_status(
    pool: &PgPool,
    event_id: Uuid,
    target: EventStatus,
) -> Result<Event, AppError> {
    let Some(expected) = target.predecessor() else {
        return Err(AppError::ValidationError(
            "Events cannot be moved back to draft".to_string(),
        ));
    };

    let updated = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET status = $2, updated_at = now()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(target.as_str())
    .bind(expected.as_str())
    .fetch_optional(pool)
    .await?;

    if let Some(event) = updated {
        return Ok(event);
    }

    match get(pool, event_id).await? {
        Some(event) => Err(AppError::Conflict(format!(
            "Event is {}, expected {}",
            event.status,
            expected.as_str()
        ))),
        None => Err(AppError::NotFound("Event not found".to_string())),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeCounts {
    pub check_ins: u64,
    pub tickets: u64,
    pub ticket_types: u64,
}

pub struct DeletedEvent {
    pub name: String,
    pub counts: CascadeCounts,
}

/// Deletes an event and everything under it in dependency order, all in one
/// transaction. Either the whole subtree goes or none of it does.
pub async fn delete_cascade(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Option<DeletedEvent>, AppError> {
    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(event) = event else {
        return Ok(None);
    };

    let check_ins = sqlx::query(
        "DELETE FROM check_ins WHERE ticket_id IN (SELECT id FROM tickets WHERE event_id = $1)",
    )
    .bind(event_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let tickets = sqlx::query("DELETE FROM tickets WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let ticket_types = sqlx::query("DELETE FROM ticket_types WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        event = %event.name,
        check_ins,
        tickets,
        ticket_types,
        "Event cascade delete committed"
    );

    Ok(Some(DeletedEvent {
        name: event.name,
        counts: CascadeCounts {
            check_ins,
            tickets,
            ticket_types,
        },
    }))
}

pub async fn recent_tickets(
    pool: &PgPool,
    event_id: Uuid,
    limit: i64,
) -> Result<Vec<crate::models::Ticket>, AppError> {
    let tickets = sqlx::query_as::<_, crate::models::Ticket>(
        "SELECT * FROM tickets WHERE event_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(event_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(tickets)
}
