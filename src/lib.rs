//! Accounts with email verification, bearer tokens and per-user stacks,
//! served over HTTP and stored in Postgres.

pub mod app;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod ids;
#[cfg(test)]
mod memory;
pub mod payload;
pub mod stacks;
pub mod state;
pub mod users;
pub mod verification;
