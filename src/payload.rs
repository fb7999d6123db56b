use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::ServiceError;

/// `Json` whose rejection is the enveloped `400`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(v)) => Ok(JsonBody(v)),
            Err(e) => {
                debug!(error = %e, "unreadable body");
                Err(ServiceError::BadRequest)
            }
        }
    }
}

/// Envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct Payload<T: Serialize> {
    pub code: u16,
    pub status: String,
    pub success: bool,
    pub data: Option<T>,
}

impl<T: Serialize> Payload<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            status: status_text(StatusCode::OK),
            success: true,
            data: Some(data),
        }
    }
}

impl Payload<()> {
    pub fn empty() -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            status: status_text(StatusCode::OK),
            success: true,
            data: None,
        }
    }

    pub fn fail(status: StatusCode) -> Self {
        Self {
            code: status.as_u16(),
            status: status_text(status),
            success: false,
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Payload<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}
