use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::CallerIdentity,
    error::ServiceResult,
    payload::{JsonBody, Payload},
    stacks::{
        dto::{ItemRequest, ItemResponse, StackResponse},
        services,
    },
    state::AppState,
};

pub fn stack_routes() -> Router<AppState> {
    Router::new()
        .route("/stacks", post(create).get(find_all))
        .route("/stacks/:id", get(find_by_id).post(push).delete(pop))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn create(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
) -> ServiceResult<Payload<StackResponse>> {
    Ok(Payload::ok(services::create(&state, &me.id).await?))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn find_by_id(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
) -> ServiceResult<Payload<StackResponse>> {
    Ok(Payload::ok(services::find_by_id_from_owner(&state, &id, &me.id).await?))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn find_all(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
) -> ServiceResult<Payload<Vec<StackResponse>>> {
    Ok(Payload::ok(services::find_all_from_owner(&state, &me.id).await?))
}

#[instrument(skip(state, payload), fields(caller = %me.id))]
pub async fn push(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ItemRequest>,
) -> ServiceResult<Payload<ItemResponse>> {
    Ok(Payload::ok(services::push_from_owner(&state, &id, &me.id, payload).await?))
}

#[instrument(skip(state), fields(caller = %me.id))]
pub async fn pop(
    State(state): State<AppState>,
    CallerIdentity(me): CallerIdentity,
    Path(id): Path<String>,
) -> ServiceResult<Payload<ItemResponse>> {
    Ok(Payload::ok(services::pop_from_owner(&state, &id, &me.id).await?))
}
