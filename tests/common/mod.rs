#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use gatepass_server::models::{Event, TicketType, User};
use gatepass_server::notify::NullNotifier;
use gatepass_server::services::issuance::{self, IssueTicketRequest, IssuedTicket};
use gatepass_server::state::AppState;
use gatepass_server::store;
use gatepass_server::utils::error::AppError;

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, Arc::new(NullNotifier))
}

pub async fn create_user(pool: &PgPool, role: &str) -> User {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, full_name, role, api_token)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(format!("{}@example.com", Uuid::new_v4().simple()))
    .bind(format!("Test {role}"))
    .bind(role)
    .bind(Uuid::new_v4().to_string())
    .fetch_one(pool)
    .await
    .expect("failed to create user")
}

pub async fn create_event(pool: &PgPool, admin: &User) -> Event {
    store::events::create(
        pool,
        store::events::NewEvent {
            name: "Test Event",
            description: None,
            banner_image: None,
            event_date: Utc::now() + Duration::days(7),
            location: "Test Hall",
            capacity: 500,
            created_by: admin.id,
        },
    )
    .await
    .expect("failed to create event")
}

pub async fn create_ticket_type(pool: &PgPool, event_id: Uuid, quantity: i32) -> TicketType {
    sqlx::query_as::<_, TicketType>(
        r#"
        INSERT INTO ticket_types (event_id, name, price, quantity, quantity_issued)
        VALUES ($1, $2, $3, $4, 0)
        RETURNING *
        "#,
    )
    .bind(event_id)
    .bind("General")
    .bind(Decimal::from(25))
    .bind(quantity)
    .fetch_one(pool)
    .await
    .expect("failed to create ticket type")
}

pub async fn issue(
    state: &AppState,
    admin: &User,
    event_id: Uuid,
    type_id: Uuid,
) -> Result<IssuedTicket, AppError> {
    issuance::issue_ticket(
        state,
        admin,
        IssueTicketRequest {
            event_id,
            ticket_type_id: Some(type_id),
            recipient_name: "Guest".to_string(),
            recipient_email: format!("{}@example.com", Uuid::new_v4().simple()),
            recipient_phone: None,
            ticket_bg_image: None,
            custom_ticket_type: None,
        },
    )
    .await
}

pub async fn quantity_issued(pool: &PgPool, type_id: Uuid) -> i32 {
    sqlx::query_scalar::<_, i32>("SELECT quantity_issued FROM ticket_types WHERE id = $1")
        .bind(type_id)
        .fetch_one(pool)
        .await
        .expect("ticket type missing")
}

pub async fn ticket_status(pool: &PgPool, ticket_id: Uuid) -> String {
    sqlx::query_scalar::<_, String>("SELECT status FROM tickets WHERE id = $1")
        .bind(ticket_id)
        .fetch_one(pool)
        .await
        .expect("ticket missing")
}

pub async fn check_in_count(pool: &PgPool, ticket_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins WHERE ticket_id = $1")
        .bind(ticket_id)
        .fetch_one(pool)
        .await
        .expect("count failed")
}
