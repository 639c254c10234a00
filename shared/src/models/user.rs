//! User and role models

use serde::{Deserialize, Serialize};

/// A user account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// bcrypt hash, never sent to clients
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Dashboard roles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Processor,
    Roaster,
    Cupper,
    HeadJudge,
    Admin,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Farmer,
        Role::Processor,
        Role::Roaster,
        Role::Cupper,
        Role::HeadJudge,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Processor => "processor",
            Role::Roaster => "roaster",
            Role::Cupper => "cupper",
            Role::HeadJudge => "head_judge",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Roles that may sit on a cupping panel
    pub fn can_judge(&self) -> bool {
        matches!(self, Role::Cupper | Role::HeadJudge)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Farmer => write!(f, "Farmer"),
            Role::Processor => write!(f, "Processor"),
            Role::Roaster => write!(f, "Roaster"),
            Role::Cupper => write!(f, "Cupper"),
            Role::HeadJudge => write!(f, "Head Judge"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: "USR-1".to_string(),
            name: "Somchai".to_string(),
            email: "farmer@coffee.test".to_string(),
            role: Role::Farmer,
            password_hash: "$2b$04$secret".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(json.contains("\"role\":\"farmer\""));
    }
}
