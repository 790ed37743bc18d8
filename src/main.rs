use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use gatepass_server::config::Config;
use gatepass_server::notify::{Notifier, NullNotifier, SendGridNotifier};
use gatepass_server::routes::create_routes;
use gatepass_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let notifier: Arc<dyn Notifier> = match config.sendgrid {
        Some(sendgrid) => Arc::new(SendGridNotifier::new(sendgrid)),
        None => {
            tracing::warn!("SendGrid not configured, ticket emails disabled");
            Arc::new(NullNotifier)
        }
    };

    let app: Router = create_routes(AppState::new(pool, notifier));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
