use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Scanner,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Scanner => "scanner",
        }
    }
}

impl User {
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.iter().any(|role| self.role == role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "staff@example.com".to_string(),
            full_name: "Staff".to_string(),
            role: role.to_string(),
            api_token: "token".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_satisfies_admin_set() {
        assert!(user_with_role("admin").has_role(&[Role::Admin]));
    }

    #[test]
    fn test_scanner_rejected_from_admin_set() {
        assert!(!user_with_role("scanner").has_role(&[Role::Admin]));
    }

    #[test]
    fn test_admin_allowed_on_scanner_endpoints() {
        assert!(user_with_role("admin").has_role(&[Role::Scanner, Role::Admin]));
    }

    #[test]
    fn test_api_token_not_serialized() {
        let json = serde_json::to_value(user_with_role("admin")).unwrap();
        assert!(json.get("api_token").is_none());
    }
}
