use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{AdminUser, StaffUser};
use crate::models::{EventPatch, EventStatus, TicketTypePatch};
use crate::state::AppState;
use crate::store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

const RECENT_TICKETS_LIMIT: i64 = 10;

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub status: Option<String>,
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    StaffUser(_user): StaffUser,
    Query(query): Query<ListEventsQuery>,
) -> Result<Response, AppError> {
    let events = store::events::list(&state.pool, query.status.as_deref()).await?;

    Ok(success(json!({ "events": events }), "Events").into_response())
}

/// GET /api/events/:id — event with statistics, ticket types and the latest
/// tickets.
pub async fn get_event(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = store::events::summary(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let ticket_types = store::ticket_types::list_for_event(&state.pool, event_id).await?;
    let recent_tickets =
        store::events::recent_tickets(&state.pool, event_id, RECENT_TICKETS_LIMIT).await?;

    Ok(success(
        json!({
            "event": event,
            "ticketTypes": ticket_types,
            "recentTickets": recent_tickets,
        }),
        "Event details",
    )
    .into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<CreateEventRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() || request.location.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Missing required fields".to_string(),
        ));
    }
    if request.capacity <= 0 {
        return Err(AppError::ValidationError(
            "Capacity must be positive".to_string(),
        ));
    }

    let event = store::events::create(
        &state.pool,
        store::events::NewEvent {
            name: request.name.trim(),
            description: request.description.as_deref(),
            banner_image: request.banner_image.as_deref(),
            event_date: request.event_date,
            location: request.location.trim(),
            capacity: request.capacity,
            created_by: admin.id,
        },
    )
    .await?;

    Ok(created(json!({ "event": event }), "Event created successfully").into_response())
}

/// PUT /api/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Response, AppError> {
    if patch.is_empty() {
        return Err(AppError::ValidationError("No fields to update".to_string()));
    }

    let event = store::events::update(&state.pool, event_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success(json!({ "event": event }), "Event updated successfully").into_response())
}

/// DELETE /api/events/:id — full cascade or nothing, with per-category
/// counts.
pub async fn delete_event(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let deleted = store::events::delete_cascade(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success(
        json!({ "deleted": deleted.counts }),
        format!(
            "Event \"{}\" and all related data deleted successfully",
            deleted.name
        ),
    )
    .into_response())
}

/// POST /api/events/:id/activate
pub async fn activate_event(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = store::events::transition_status(&state.pool, event_id, EventStatus::Active).await?;

    Ok(success(json!({ "event": event }), "Event activated successfully").into_response())
}

/// POST /api/events/:id/close
pub async fn close_event(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = store::events::transition_status(&state.pool, event_id, EventStatus::Closed).await?;

    Ok(success(json!({ "event": event }), "Event closed successfully").into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketTypeRequest {
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    pub quantity: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// POST /api/events/:id/ticket-types
pub async fn add_ticket_type(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(event_id): Path<Uuid>,
    Json(request): Json<CreateTicketTypeRequest>,
) -> Result<Response, AppError> {
    if request.name.trim().is_empty() || request.quantity <= 0 {
        return Err(AppError::ValidationError(
            "Name and quantity required".to_string(),
        ));
    }

    store::events::get(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let ticket_type = store::ticket_types::create(
        &state.pool,
        event_id,
        store::ticket_types::NewTicketType {
            name: request.name.trim(),
            price: request.price.unwrap_or_default(),
            quantity: request.quantity,
            description: request.description.as_deref(),
            color: request.color.as_deref(),
        },
    )
    .await?;

    Ok(created(json!({ "ticketType": ticket_type }), "Custom ticket type created").into_response())
}

/// PUT /api/events/:id/ticket-types/:type_id
pub async fn update_ticket_type(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path((event_id, type_id)): Path<(Uuid, Uuid)>,
    Json(patch): Json<TicketTypePatch>,
) -> Result<Response, AppError> {
    if patch.is_empty() {
        return Err(AppError::ValidationError("No fields to update".to_string()));
    }

    let ticket_type = store::ticket_types::update(&state.pool, event_id, type_id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;

    Ok(success(json!({ "ticketType": ticket_type }), "Ticket type updated").into_response())
}
