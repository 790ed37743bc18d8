use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::models::{Role, User};
use crate::state::AppState;
use crate::utils::error::AppError;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Scanner, Role::Admin];

/// Caller authenticated with the admin role. Issuance and catalog endpoints
/// extract this before touching any state.
pub struct AdminUser(pub User);

/// Caller authenticated as scanner or admin, for the scan-path endpoints.
pub struct StaffUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        authorize(parts, state, ADMIN_ONLY).await.map(AdminUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        authorize(parts, state, STAFF).await.map(StaffUser)
    }
}

/// Resolves the bearer token to a user record and checks its role against the
/// permitted set. Token issuance itself is an external concern; the token is
/// opaque here.
async fn authorize(parts: &Parts, state: &AppState, allowed: &[Role]) -> Result<User, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::AuthError("Missing or malformed access token".to_string()))?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, full_name, role, api_token, created_at FROM users WHERE api_token = $1",
    )
    .bind(token)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::AuthError("Invalid access token".to_string()))?;

    if !user.has_role(allowed) {
        tracing::warn!(user_id = %user.id, role = %user.role, "Role check failed");
        return Err(AppError::Forbidden(format!(
            "{} access required",
            allowed[0].as_str()
        )));
    }

    Ok(user)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .header(AUTHORIZATION, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth("Bearer abc123");
        assert_eq!(bearer_token(&parts), Some("abc123"));
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let parts = parts_with_auth("Basic abc123");
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_empty_token_rejected() {
        let parts = parts_with_auth("Bearer ");
        assert_eq!(bearer_token(&parts), None);
    }
}
