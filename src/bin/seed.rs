//! Development seed: staff accounts with fixed api tokens and one sample
//! event with the default ticket tiers.

use chrono::{Duration, Utc};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let admin_id = seed_user(
        &pool,
        "admin@gatepass.dev",
        "Avery Admin",
        "admin",
        "dev-admin-token",
    )
    .await;
    seed_user(
        &pool,
        "scanner@gatepass.dev",
        "Sam Scanner",
        "scanner",
        "dev-scanner-token",
    )
    .await;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
        .fetch_one(&pool)
        .await
        .expect("Failed to count events");

    if existing == 0 {
        let event = gatepass_server::store::events::create(
            &pool,
            gatepass_server::store::events::NewEvent {
                name: "Launch Night",
                description: Some("Sample event seeded for development"),
                banner_image: None,
                event_date: Utc::now() + Duration::days(30),
                location: "Main Hall",
                capacity: 200,
                created_by: admin_id,
            },
        )
        .await
        .expect("Failed to seed event");

        tracing::info!(event = %event.name, "Seeded sample event");
    }

    tracing::info!("Seed complete");
}

async fn seed_user(pool: &PgPool, email: &str, name: &str, role: &str, token: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, full_name, role, api_token)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(role)
    .bind(token)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}
