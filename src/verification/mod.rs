//! Email verification codes: issue, resend after cooldown, consume once.

pub mod code;
pub mod mailer;
pub mod repo;
pub mod repo_types;
pub mod services;
