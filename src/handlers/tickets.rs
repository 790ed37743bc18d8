use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::models::TicketPatch;
use crate::notify::TicketNotification;
use crate::services::issuance::{self, IssueTicketRequest};
use crate::state::AppState;
use crate::store;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

/// POST /api/tickets/create
pub async fn create_ticket(
    State(state): State<AppState>,
    AdminUser(issuer): AdminUser,
    Json(request): Json<IssueTicketRequest>,
) -> Result<Response, AppError> {
    let ticket = issuance::issue_ticket(&state, &issuer, request).await?;

    Ok(created(json!({ "ticket": ticket }), "Ticket created successfully").into_response())
}

/// PUT /api/tickets/:id
pub async fn update_ticket(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(ticket_id): Path<Uuid>,
    Json(patch): Json<TicketPatch>,
) -> Result<Response, AppError> {
    if patch.is_empty() {
        return Err(AppError::ValidationError("No fields to update".to_string()));
    }

    let ticket = store::tickets::update(&state.pool, ticket_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok(success(json!({ "ticket": ticket }), "Ticket updated successfully").into_response())
}

/// DELETE /api/tickets/:id — removes the ticket and its check-ins, returning
/// capacity to the ledger for non-custom types.
pub async fn delete_ticket(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let deleted = store::tickets::delete(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok(empty_success(format!(
        "Ticket {} deleted successfully",
        deleted.ticket_number
    ))
    .into_response())
}

/// POST /api/tickets/resend/:id — re-delivers the stored artifact. Never
/// touches ticket state or the redemption code, however often it is called.
pub async fn resend_ticket(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket = store::tickets::details_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    let notification = TicketNotification {
        recipient_email: ticket.recipient_email.clone(),
        recipient_name: ticket.recipient_name.clone(),
        event_name: ticket.event_name.clone(),
        event_date: ticket.event_date.to_rfc3339(),
        event_location: ticket.event_location.clone(),
        ticket_number: ticket.ticket_number.clone(),
        ticket_type: ticket.ticket_type_name.clone(),
        qr_payload: ticket.qr_code.clone(),
    };

    match state.notifier.send_ticket(&notification).await {
        Ok(()) => {
            store::tickets::mark_email_sent(&state.pool, ticket.id).await?;
            Ok(empty_success("Ticket email resent successfully").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, ticket_id = %ticket.id, "Resend failed");
            Err(AppError::ExternalServiceError(
                "Failed to resend ticket email".to_string(),
            ))
        }
    }
}

/// GET /api/tickets/event/:event_id
pub async fn get_event_tickets(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let tickets = store::tickets::list_for_event(&state.pool, event_id).await?;

    let total = tickets.len();
    Ok(success(
        json!({ "tickets": tickets, "total": total }),
        "Event tickets",
    )
    .into_response())
}
