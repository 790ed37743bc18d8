//! The redemption engine. One atomic compare-and-swap decides the winner
//! among racing scanners; losers get a deterministic rejection carrying the
//! winning scan's provenance.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::models::User;
use crate::store;
use crate::utils::error::AppError;

/// Upper bound on the whole scan, lock waits included. Hitting it aborts the
/// transaction; the ticket is left exactly as it was.
const REDEEM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemedTicket {
    pub ticket_number: String,
    pub recipient_name: String,
    pub recipient_email: String,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub event_location: String,
    pub ticket_type: String,
    pub check_in_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedTicket {
    pub ticket_number: String,
    pub recipient_name: String,
    pub event_name: String,
    pub ticket_type: String,
    pub status: String,
}

#[derive(Debug)]
pub enum RedemptionOutcome {
    /// This scan won the `active -> used` transition; a check-in was recorded.
    Accepted(RedeemedTicket),
    /// The ticket was redeemed earlier (or by a concurrent scan that won the
    /// race); the original check-in's provenance is included.
    AlreadyUsed {
        ticket: RejectedTicket,
        previous_check_in: Option<DateTime<Utc>>,
        scanned_by: Option<String>,
    },
    /// Cancelled tickets never admit and are never mutated by a scan.
    Cancelled { ticket: RejectedTicket },
    /// No ticket carries this code.
    NotFound,
}

/// `Redeem(redemptionCode, scannerIdentity) -> RedemptionOutcome`.
///
/// The losing side of a race gets its rejection as a final answer, not a
/// transient error; only infrastructure failures are retryable.
pub async fn redeem(
    pool: &PgPool,
    qr_code: &str,
    scanner: &User,
) -> Result<RedemptionOutcome, AppError> {
    match tokio::time::timeout(REDEEM_TIMEOUT, redeem_inner(pool, qr_code, scanner)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(scanner = %scanner.id, "Redemption timed out");
            Err(AppError::Transient(
                "Validation timed out, scan again".to_string(),
            ))
        }
    }
}

async fn redeem_inner(
    pool: &PgPool,
    qr_code: &str,
    scanner: &User,
) -> Result<RedemptionOutcome, AppError> {
    let mut tx = pool.begin().await?;

    if let Some(ticket) = store::tickets::redeem_active(&mut tx, qr_code).await? {
        let check_in = store::check_ins::append(&mut tx, ticket.id, scanner.id).await?;
        let details = store::tickets::find_by_qr_code(&mut tx, qr_code)
            .await?
            .ok_or_else(|| {
                AppError::InternalServerError("Redeemed ticket vanished mid-transaction".to_string())
            })?;

        tx.commit().await?;

        tracing::info!(
            ticket_number = %details.ticket_number,
            scanner = %scanner.id,
            "Ticket redeemed"
        );

        return Ok(RedemptionOutcome::Accepted(RedeemedTicket {
            ticket_number: details.ticket_number,
            recipient_name: details.recipient_name,
            recipient_email: details.recipient_email,
            event_name: details.event_name,
            event_date: details.event_date,
            event_location: details.event_location,
            ticket_type: details.ticket_type_name,
            check_in_time: check_in.check_in_time,
        }));
    }

    // Lost the race or the ticket was never redeemable; a fresh read decides
    // which rejection applies. Nothing was written, so the transaction ends.
    let existing = store::tickets::find_by_qr_code(&mut tx, qr_code).await?;
    tx.rollback().await?;

    let Some(ticket) = existing else {
        return Ok(RedemptionOutcome::NotFound);
    };

    let rejected = RejectedTicket {
        ticket_number: ticket.ticket_number.clone(),
        recipient_name: ticket.recipient_name.clone(),
        event_name: ticket.event_name.clone(),
        ticket_type: ticket.ticket_type_name.clone(),
        status: ticket.status.clone(),
    };

    match ticket.status.as_str() {
        "used" => {
            let prior = store::check_ins::last_for_ticket(pool, ticket.id).await?;
            tracing::info!(
                ticket_number = %rejected.ticket_number,
                scanner = %scanner.id,
                "Rejected scan of used ticket"
            );
            Ok(RedemptionOutcome::AlreadyUsed {
                ticket: rejected,
                previous_check_in: prior.as_ref().map(|p| p.check_in_time),
                scanned_by: prior.map(|p| p.scanner_name),
            })
        }
        "cancelled" => Ok(RedemptionOutcome::Cancelled { ticket: rejected }),
        // The CAS saw a non-active state that a later read no longer sees;
        // only an intervening admin write can do this. Ask for a rescan.
        _ => Err(AppError::Transient(
            "Ticket state changed during validation, scan again".to_string(),
        )),
    }
}

/// Scanner-surface lookup by human-readable ticket number.
pub async fn lookup(
    pool: &PgPool,
    ticket_number: &str,
) -> Result<Option<crate::models::TicketDetails>, AppError> {
    store::tickets::find_by_ticket_number(pool, ticket_number).await
}

/// History and stats pass straight through to the check-in log.
pub async fn scan_history(
    pool: &PgPool,
    scanner_id: Uuid,
) -> Result<Vec<crate::models::CheckInRecord>, AppError> {
    store::check_ins::history_for_scanner(pool, scanner_id).await
}

pub async fn scanner_stats(
    pool: &PgPool,
    scanner_id: Uuid,
) -> Result<store::check_ins::ScannerStats, AppError> {
    store::check_ins::stats_for_scanner(pool, scanner_id).await
}
