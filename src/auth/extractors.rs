use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    auth::{claims::Identity, services},
    error::ServiceError,
    payload::Payload,
    state::AppState,
};

/// Gate for authenticated route groups. On success the caller's [`Identity`]
/// is stored in the request extensions for [`CallerIdentity`].
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("missing or malformed Authorization header");
        return Payload::fail(StatusCode::UNAUTHORIZED).into_response();
    };

    match services::validate(&state, token).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(ServiceError::NotFound | ServiceError::Unauthorized) => {
            Payload::fail(StatusCode::UNAUTHORIZED).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Identity placed by [`require_auth`].
pub struct CallerIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CallerIdentity)
            .ok_or_else(|| {
                error!(path = %parts.uri.path(), "route reached without caller identity");
                ServiceError::BadRequest
            })
    }
}
