//! Append-only check-in log. Rows are only ever written from the redemption
//! transaction; everything else is read.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{CheckIn, CheckInRecord};
use crate::utils::error::AppError;

const HISTORY_LIMIT: i64 = 50;

/// Appends the check-in for a winning scan, inside that scan's transaction.
pub async fn append(
    conn: &mut PgConnection,
    ticket_id: Uuid,
    scanner_id: Uuid,
) -> Result<CheckIn, AppError> {
    let check_in = sqlx::query_as::<_, CheckIn>(
        r#"
        INSERT INTO check_ins (ticket_id, scanner_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(ticket_id)
    .bind(scanner_id)
    .fetch_one(conn)
    .await?;

    Ok(check_in)
}

#[derive(Debug, Clone, FromRow)]
pub struct PriorCheckIn {
    pub check_in_time: DateTime<Utc>,
    pub scanner_name: String,
}

/// The winning scan's provenance, reported back to losing scanners.
pub async fn last_for_ticket(
    pool: &PgPool,
    ticket_id: Uuid,
) -> Result<Option<PriorCheckIn>, AppError> {
    let prior = sqlx::query_as::<_, PriorCheckIn>(
        r#"
        SELECT ci.check_in_time, u.full_name AS scanner_name
        FROM check_ins ci
        JOIN users u ON ci.scanner_id = u.id
        WHERE ci.ticket_id = $1
        ORDER BY ci.check_in_time DESC
        LIMIT 1
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(pool)
    .await?;

    Ok(prior)
}

pub async fn history_for_scanner(
    pool: &PgPool,
    scanner_id: Uuid,
) -> Result<Vec<CheckInRecord>, AppError> {
    let history = sqlx::query_as::<_, CheckInRecord>(
        r#"
        SELECT ci.id, ci.ticket_id, ci.scanner_id, ci.check_in_time,
               t.ticket_number, t.recipient_name,
               e.name AS event_name, tt.name AS ticket_type_name
        FROM check_ins ci
        JOIN tickets t ON ci.ticket_id = t.id
        JOIN events e ON t.event_id = e.id
        JOIN ticket_types tt ON t.ticket_type_id = tt.id
        WHERE ci.scanner_id = $1
        ORDER BY ci.check_in_time DESC
        LIMIT $2
        "#,
    )
    .bind(scanner_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(history)
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScannerStats {
    pub total_scans: i64,
    pub today_scans: i64,
}

pub async fn stats_for_scanner(pool: &PgPool, scanner_id: Uuid) -> Result<ScannerStats, AppError> {
    let stats = sqlx::query_as::<_, ScannerStats>(
        r#"
        SELECT COUNT(*) AS total_scans,
               COUNT(*) FILTER (WHERE check_in_time::date = CURRENT_DATE) AS today_scans
        FROM check_ins
        WHERE scanner_id = $1
        "#,
    )
    .bind(scanner_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
