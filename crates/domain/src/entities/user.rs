//! User entity - a local account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Username;
use crate::UserId;

/// What a user does at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Runs campaigns; may schedule, finalize and award XP.
    Dm,
    Player,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dm => write!(f, "DM"),
            Self::Player => write!(f, "Player"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dm" | "gm" | "dungeon_master" | "dungeon-master" => Ok(Self::Dm),
            "player" => Ok(Self::Player),
            other => Err(DomainError::parse(format!("Unknown role: {}", other))),
        }
    }
}

/// A local account.
///
/// Passwords are stored and compared as plain text; the store never leaves
/// the local machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: Username,
        password: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let password = password.into();
        if password.is_empty() {
            return Err(DomainError::validation("Password cannot be empty"));
        }
        Ok(Self {
            id: UserId::new(),
            username,
            password,
            role,
            created_at: now,
        })
    }

    pub fn check_password(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn is_dm(&self) -> bool {
        self.role == Role::Dm
    }
}
