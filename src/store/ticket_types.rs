//! Inventory ledger. Owns the issued-count counters; the capacity check and
//! the increment are one statement so concurrent issuance cannot oversell.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{TicketType, TicketTypePatch};
use crate::utils::error::AppError;

/// Reserves one unit of a ticket type inside the caller's transaction.
///
/// Custom types bypass the capacity check but still count what was issued.
/// Returns `Conflict` when the type is sold out and `NotFound` when it does
/// not exist.
pub async fn reserve(conn: &mut PgConnection, type_id: Uuid) -> Result<TicketType, AppError> {
    let reserved = sqlx::query_as::<_, TicketType>(
        r#"
        UPDATE ticket_types
        SET quantity_issued = quantity_issued + 1
        WHERE id = $1 AND (is_custom OR quantity_issued < quantity)
        RETURNING *
        "#,
    )
    .bind(type_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(ticket_type) = reserved {
        return Ok(ticket_type);
    }

    // No row updated: either the type is unknown or it is sold out.
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ticket_types WHERE id = $1")
        .bind(type_id)
        .fetch_one(&mut *conn)
        .await?;

    if exists > 0 {
        Err(AppError::Conflict(
            "Ticket type capacity exceeded".to_string(),
        ))
    } else {
        Err(AppError::NotFound("Ticket type not found".to_string()))
    }
}

/// Returns one unit to the ledger, flooring at zero. Custom types are
/// uncapped one-offs and keep their count.
pub async fn release(conn: &mut PgConnection, type_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE ticket_types
        SET quantity_issued = GREATEST(0, quantity_issued - 1)
        WHERE id = $1 AND is_custom = false
        "#,
    )
    .bind(type_id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Creates the inline, uncapped type used for one-off issuance.
pub async fn create_custom(
    conn: &mut PgConnection,
    event_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<TicketType, AppError> {
    let ticket_type = sqlx::query_as::<_, TicketType>(
        r#"
        INSERT INTO ticket_types (event_id, name, price, quantity, is_custom, description)
        VALUES ($1, $2, 0, 1, true, $3)
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(name)
    .bind(description)
    .fetch_one(conn)
    .await?;

    Ok(ticket_type)
}

pub struct NewTicketType<'a> {
    pub name: &'a str,
    pub price: Decimal,
    pub quantity: i32,
    pub description: Option<&'a str>,
    pub color: Option<&'a str>,
}

pub async fn create(
    pool: &PgPool,
    event_id: Uuid,
    new_type: NewTicketType<'_>,
) -> Result<TicketType, AppError> {
    let ticket_type = sqlx::query_as::<_, TicketType>(
        r#"
        INSERT INTO ticket_types (event_id, name, price, quantity, is_custom, description, color)
        VALUES ($1, $2, $3, $4, true, $5, $6)
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind(new_type.name)
    .bind(new_type.price)
    .bind(new_type.quantity)
    .bind(new_type.description)
    .bind(new_type.color)
    .fetch_one(pool)
    .await?;

    Ok(ticket_type)
}

pub async fn update(
    pool: &PgPool,
    event_id: Uuid,
    type_id: Uuid,
    patch: &TicketTypePatch,
) -> Result<Option<TicketType>, AppError> {
    let updated = sqlx::query_as::<_, TicketType>(
        r#"
        UPDATE ticket_types
        SET name = COALESCE($3, name),
            price = COALESCE($4, price),
            quantity = COALESCE($5, quantity),
            description = COALESCE($6, description)
        WHERE id = $1 AND event_id = $2
        RETURNING *
        "#,
    )
    .bind(type_id)
    .bind(event_id)
    .bind(patch.name.as_deref())
    .bind(patch.price)
    .bind(patch.quantity)
    .bind(patch.description.as_deref())
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

pub async fn list_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<TicketType>, AppError> {
    let types = sqlx::query_as::<_, TicketType>(
        "SELECT * FROM ticket_types WHERE event_id = $1 ORDER BY price ASC",
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(types)
}
