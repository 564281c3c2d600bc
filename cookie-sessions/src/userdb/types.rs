use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents a user identity in the system.
///
/// Users are created on the first successful identity-provider login with a
/// previously-unseen email and are immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Normalized (lowercased, trimmed) email address; unique
    pub email: String,
    /// Display name
    pub name: String,
    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id. The email is stored as given;
    /// normalize it first.
    pub fn new(email: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            name,
            created_at: Utc::now(),
        }
    }
}

/// Emails are compared case-insensitively and without surrounding
/// whitespace, both at creation and at lookup.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
