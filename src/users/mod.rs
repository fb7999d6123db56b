use crate::{auth::extractors::require_auth, state::AppState};
use axum::{middleware, Router};

pub mod dto;
mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

/// `/users` routes, all behind bearer authentication.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::user_routes().route_layer(middleware::from_fn_with_state(state, require_auth))
}
