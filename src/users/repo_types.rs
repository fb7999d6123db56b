use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Encoded as an integer on the wire and in tokens (client = 0, admin = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum UserRole {
    Client,
    Admin,
}

impl From<UserRole> for u8 {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Client => 0,
            UserRole::Admin => 1,
        }
    }
}

impl TryFrom<u8> for UserRole {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(UserRole::Client),
            1 => Ok(UserRole::Admin),
            other => Err(format!("unknown user role {other}")),
        }
    }
}

/// User document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub email: String,
    pub password: String, // stored verbatim
    pub verified: bool,
}

/// Row shape in the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub role: i16,
    pub email: String,
    pub password: String,
    pub verified: bool,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let role = u8::try_from(r.role)
            .map_err(anyhow::Error::from)
            .and_then(|v| UserRole::try_from(v).map_err(anyhow::Error::msg))?;
        Ok(Self {
            id: r.id,
            name: r.name,
            role,
            email: r.email,
            password: r.password,
            verified: r.verified,
        })
    }
}
