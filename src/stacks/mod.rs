use crate::{auth::extractors::require_auth, state::AppState};
use axum::{middleware, Router};

pub mod dto;
mod handlers;
pub mod locks;
pub mod repo;
pub mod repo_types;
pub mod services;

/// `/stacks` routes, all behind bearer authentication and scoped to the caller.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::stack_routes().route_layer(middleware::from_fn_with_state(state, require_auth))
}
