//! Ticket persistence and lifecycle transitions. This module is the only
//! writer of ticket state; `redeem_active` is the serialization point the
//! scan path relies on.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Ticket, TicketDetails, TicketPatch, TicketStatus, TicketWithCheckIn};
use crate::store::ticket_types;
use crate::utils::error::AppError;

pub struct NewTicket<'a> {
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub qr_code: &'a str,
    pub ticket_number: &'a str,
    pub recipient_name: &'a str,
    pub recipient_email: &'a str,
    pub recipient_phone: Option<&'a str>,
    pub ticket_bg_image: Option<&'a str>,
    pub created_by: Uuid,
}

/// Inserts a ticket inside the caller's transaction. A duplicate ticket
/// number or redemption code surfaces as a retryable conflict instead of
/// silently overwriting.
pub async fn insert(conn: &mut PgConnection, new: NewTicket<'_>) -> Result<Ticket, AppError> {
    sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (
            event_id, ticket_type_id, qr_code, ticket_number,
            recipient_name, recipient_email, recipient_phone,
            ticket_bg_image, status, created_by, email_sent
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9, false)
        RETURNING *
        "#,
    )
    .bind(new.event_id)
    .bind(new.ticket_type_id)
    .bind(new.qr_code)
    .bind(new.ticket_number)
    .bind(new.recipient_name)
    .bind(new.recipient_email)
    .bind(new.recipient_phone)
    .bind(new.ticket_bg_image)
    .bind(new.created_by)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        AppError::from_unique_violation(e, "Ticket number collision, retry the request")
    })
}

/// Compare-and-swap transition `active -> used`, keyed by redemption code.
///
/// Of any number of concurrent callers exactly one gets the row back; the
/// rest see no row because the state they expected is gone. Runs in the
/// caller's transaction so the check-in append commits with it.
pub async fn redeem_active(
    conn: &mut PgConnection,
    qr_code: &str,
) -> Result<Option<Ticket>, AppError> {
    let ticket = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET status = 'used', updated_at = now()
        WHERE qr_code = $1 AND status = 'active'
        RETURNING *
        "#,
    )
    .bind(qr_code)
    .fetch_optional(conn)
    .await?;

    Ok(ticket)
}

pub async fn find_by_qr_code(
    conn: &mut PgConnection,
    qr_code: &str,
) -> Result<Option<TicketDetails>, AppError> {
    let ticket = sqlx::query_as::<_, TicketDetails>(
        r#"
        SELECT t.id, t.event_id, t.ticket_type_id, t.qr_code, t.ticket_number,
               t.recipient_name, t.recipient_email, t.recipient_phone,
               t.status, t.email_sent, t.created_at,
               e.name AS event_name, e.event_date, e.location AS event_location,
               tt.name AS ticket_type_name
        FROM tickets t
        JOIN events e ON t.event_id = e.id
        JOIN ticket_types tt ON t.ticket_type_id = tt.id
        WHERE t.qr_code = $1
        "#,
    )
    .bind(qr_code)
    .fetch_optional(conn)
    .await?;

    Ok(ticket)
}

pub async fn details_by_id(
    pool: &PgPool,
    ticket_id: Uuid,
) -> Result<Option<TicketDetails>, AppError> {
    let ticket = sqlx::query_as::<_, TicketDetails>(
        r#"
        SELECT t.id, t.event_id, t.ticket_type_id, t.qr_code, t.ticket_number,
               t.recipient_name, t.recipient_email, t.recipient_phone,
               t.status, t.email_sent, t.created_at,
               e.name AS event_name, e.event_date, e.location AS event_location,
               tt.name AS ticket_type_name
        FROM tickets t
        JOIN events e ON t.event_id = e.id
        JOIN ticket_types tt ON t.ticket_type_id = tt.id
        WHERE t.id = $1
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(pool)
    .await?;

    Ok(ticket)
}

pub async fn find_by_ticket_number(
    pool: &PgPool,
    ticket_number: &str,
) -> Result<Option<TicketDetails>, AppError> {
    let ticket = sqlx::query_as::<_, TicketDetails>(
        r#"
        SELECT t.id, t.event_id, t.ticket_type_id, t.qr_code, t.ticket_number,
               t.recipient_name, t.recipient_email, t.recipient_phone,
               t.status, t.email_sent, t.created_at,
               e.name AS event_name, e.event_date, e.location AS event_location,
               tt.name AS ticket_type_name
        FROM tickets t
        JOIN events e ON t.event_id = e.id
        JOIN ticket_types tt ON t.ticket_type_id = tt.id
        WHERE t.ticket_number = $1
        "#,
    )
    .bind(ticket_number)
    .fetch_optional(pool)
    .await?;

    Ok(ticket)
}

pub async fn list_for_event(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Vec<TicketWithCheckIn>, AppError> {
    let tickets = sqlx::query_as::<_, TicketWithCheckIn>(
        r#"
        SELECT t.id, t.ticket_number, t.qr_code, t.recipient_name, t.recipient_email,
               t.recipient_phone, t.status, t.email_sent, t.created_at,
               tt.name AS ticket_type_name,
               c.check_in_time, u.full_name AS scanner_name
        FROM tickets t
        JOIN ticket_types tt ON t.ticket_type_id = tt.id
        LEFT JOIN check_ins c ON t.id = c.ticket_id
        LEFT JOIN users u ON c.scanner_id = u.id
        WHERE t.event_id = $1
        ORDER BY t.created_at DESC
        "#,
    )
    .bind(event_id)
    .fetch_all(pool)
    .await?;

    Ok(tickets)
}

/// Partial update through a typed patch. Reactivating a ticket is not a
/// supported transition, so `status = active` is rejected before the query.
pub async fn update(
    pool: &PgPool,
    ticket_id: Uuid,
    patch: &TicketPatch,
) -> Result<Option<Ticket>, AppError> {
    if patch.status == Some(TicketStatus::Active) {
        return Err(AppError::Conflict(
            "Tickets cannot be returned to active".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET recipient_name = COALESCE($2, recipient_name),
            recipient_email = COALESCE($3, recipient_email),
            recipient_phone = COALESCE($4, recipient_phone),
            status = COALESCE($5, status),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(ticket_id)
    .bind(patch.recipient_name.as_deref())
    .bind(patch.recipient_email.as_deref())
    .bind(patch.recipient_phone.as_deref())
    .bind(patch.status.map(TicketStatus::as_str))
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

pub struct DeletedTicket {
    pub ticket_number: String,
    pub check_ins_removed: u64,
}

/// Removes a ticket and its check-ins in one transaction, returning one unit
/// to the ledger for non-custom types.
pub async fn delete(pool: &PgPool, ticket_id: Uuid) -> Result<Option<DeletedTicket>, AppError> {
    let mut tx = pool.begin().await?;

    let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
        .bind(ticket_id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(ticket) = ticket else {
        return Ok(None);
    };

    let check_ins = sqlx::query("DELETE FROM check_ins WHERE ticket_id = $1")
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?;

    ticket_types::release(&mut tx, ticket.ticket_type_id).await?;

    tx.commit().await?;

    Ok(Some(DeletedTicket {
        ticket_number: ticket.ticket_number,
        check_ins_removed: check_ins,
    }))
}

pub async fn mark_email_sent(pool: &PgPool, ticket_id: Uuid) -> Result<(), AppError> {
    sqlx::query("UPDATE tickets SET email_sent = true, updated_at = now() WHERE id = $1")
        .bind(ticket_id)
        .execute(pool)
        .await?;

    Ok(())
}
