use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    (1..=128).contains(&name.chars().count())
}

/// Body of `/signup` and admin `POST /users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl UserCreateRequest {
    pub fn is_valid(&self) -> bool {
        is_valid_name(&self.name)
            && is_valid_email(&self.email)
            && self.password.chars().count() >= 8
    }
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailVerificationRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

impl EmailVerificationRequest {
    pub fn is_valid(&self) -> bool {
        is_valid_email(&self.email) && self.code.chars().count() == 6
    }
}

#[derive(Debug, Deserialize)]
pub struct ResendRequest {
    #[serde(default)]
    pub email: String,
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self { id: u.id, name: u.name }
    }
}
