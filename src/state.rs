use std::sync::Arc;

use sqlx::PgPool;

use crate::notify::Notifier;

/// Shared application state. The pool is the only shared resource; every
/// logical operation checks a connection out for its full duration and the
/// pool reclaims it on all exit paths.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }
}
