use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{self, events, scanner, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/events", event_routes())
        .nest("/api/tickets", ticket_routes())
        .nest("/api/scanner", scanner_routes())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/:event_id/activate", post(events::activate_event))
        .route("/:event_id/close", post(events::close_event))
        .route("/:event_id/ticket-types", post(events::add_ticket_type))
        .route(
            "/:event_id/ticket-types/:type_id",
            put(events::update_ticket_type),
        )
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(tickets::create_ticket))
        .route(
            "/:ticket_id",
            put(tickets::update_ticket).delete(tickets::delete_ticket),
        )
        .route("/resend/:ticket_id", post(tickets::resend_ticket))
        .route("/event/:event_id", get(tickets::get_event_tickets))
}

fn scanner_routes() -> Router<AppState> {
    Router::new()
        .route("/validate", post(scanner::validate_ticket))
        .route("/history", get(scanner::get_scan_history))
        .route("/stats", get(scanner::get_scanner_stats))
        .route("/lookup/:ticket_number", get(scanner::lookup_ticket))
}
