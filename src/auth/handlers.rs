use axum::{extract::State, routing::post, Router};
use tracing::instrument;

use crate::{
    auth::{dto::AuthRequest, services},
    error::{ServiceError, ServiceResult},
    payload::{JsonBody, Payload},
    state::AppState,
    users::{
        self,
        dto::{EmailVerificationRequest, ResendRequest, UserCreateRequest, UserResponse},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", post(signin))
        .route("/signup", post(signup))
        .route("/verification", post(verification))
        .route("/resend", post(resend))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signin(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AuthRequest>,
) -> ServiceResult<Payload<String>> {
    let token = services::signin(&state, &payload).await.map_err(|e| match e {
        // unknown email and bad password look the same from outside
        ServiceError::NotFound => ServiceError::Unauthorized,
        other => other,
    })?;
    Ok(Payload::ok(token))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserCreateRequest>,
) -> ServiceResult<Payload<UserResponse>> {
    let user = users::services::create(&state, payload).await?;
    Ok(Payload::ok(user))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn verification(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EmailVerificationRequest>,
) -> ServiceResult<Payload<UserResponse>> {
    let user = users::services::verify(&state, payload).await?;
    Ok(Payload::ok(user))
}

#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn resend(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ResendRequest>,
) -> ServiceResult<Payload<()>> {
    users::services::resend(&state, payload).await?;
    Ok(Payload::empty())
}
