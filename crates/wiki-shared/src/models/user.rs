use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Whether this role may create new documents
    pub fn can_create(&self) -> bool {
        match self {
            Self::Admin | Self::Editor => true,
            Self::Viewer => false,
        }
    }

    /// Whether this role may edit and delete documents it does not own
    pub fn overrides_ownership(&self) -> bool {
        match self {
            Self::Admin => true,
            Self::Editor | Self::Viewer => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}', expected one of admin, editor, viewer")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "wire::deserialize_id")]
    pub id: String,
    pub name: String,
    /// Unique per user; documents reference their owner by this value
    pub email: String,
    pub role: Role,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "wire::deserialize_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" editor ".parse::<Role>(), Ok(Role::Editor));
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn only_viewers_cannot_create() {
        for role in Role::ALL {
            assert_eq!(role.can_create(), role != Role::Viewer);
        }
    }

    #[test]
    fn user_decodes_backend_payload() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "editor",
            "createdAt": "2024-03-01T09:30:00.123456"
        }))
        .unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Editor);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn unknown_role_on_the_wire_is_rejected() {
        let result: Result<User, _> = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Eve",
            "email": "eve@example.com",
            "role": "superuser"
        }));
        assert!(result.is_err());
    }
}
