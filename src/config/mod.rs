use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub sendgrid: Option<SendGridConfig>,
}

pub struct SendGridConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        let sendgrid = match (env::var("SENDGRID_API_KEY"), env::var("SENDGRID_FROM_EMAIL")) {
            (Ok(api_key), Ok(from_email)) => Some(SendGridConfig {
                api_key,
                from_email,
                from_name: env::var("SENDGRID_FROM_NAME")
                    .unwrap_or_else(|_| "Gatepass".to_string()),
            }),
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/gatepass".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            sendgrid,
        }
    }
}
