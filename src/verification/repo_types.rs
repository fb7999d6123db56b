use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Pending email verification, one per email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EmailVerification {
    pub email: String,
    pub code: String,
    pub expiration: i64, // unix seconds
    pub cooldown: i64,   // unix seconds before a resend is allowed
}
