use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{claims::Identity, extractors::CallerIdentity},
    error::{ServiceError, ServiceResult},
    payload::{JsonBody, Payload},
    state::AppState,
    users::{
        dto::{UserCreateRequest, UserResponse, UserUpdateRequest},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(find_all).post(create))
        .route("/users/:id", get(find_by_id).put(update).delete(delete))
}

#[instrument(skip(state, payload), fields(caller = %me.id))]
pub async fn create(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    JsonBody(payload): JsonBody<UserCreateRequest>,
) -> ServiceResult<Payload<UserResponse>> {
    if !me.is_admin() {
        warn!("non-admin tried to create a user");
        return Err(ServiceError::Unauthorized);
    }
    Ok(Payload::ok(services::create(&state, payload).await?))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn find_by_id(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
) -> ServiceResult<Payload<UserResponse>> {
    let id = if id == "me" { me.id } else { id };
    Ok(Payload::ok(services::find_by_id(&state, &id).await?))
}

#[instrument(skip(state))]
pub async fn find_all(State(state): State<AppState>) -> ServiceResult<Payload<Vec<UserResponse>>> {
    Ok(Payload::ok(services::find_all(&state).await?))
}

#[instrument(skip(state, payload), fields(caller = %me.id))]
pub async fn update(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UserUpdateRequest>,
) -> ServiceResult<Payload<UserResponse>> {
    let id = self_or_admin(&me, id)?;
    Ok(Payload::ok(services::update(&state, &id, payload).await?))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn delete(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
) -> ServiceResult<Payload<()>> {
    let id = self_or_admin(&me, id)?;
    services::delete(&state, &id).await?;
    Ok(Payload::empty())
}

/// `me` always targets the caller; any other id needs the admin role.
fn self_or_admin(me: &Identity, id: String) -> ServiceResult<String> {
    if id == "me" {
        return Ok(me.id.clone());
    }
    if !me.is_admin() {
        warn!(target_id = %id, "non-admin tried to act on another user");
        return Err(ServiceError::Unauthorized);
    }
    Ok(id)
}
