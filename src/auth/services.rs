use tracing::{info, warn};

use crate::{
    auth::{claims::Identity, dto::AuthRequest, jwt::TokenError},
    error::{ServiceError, ServiceResult},
    state::AppState,
};

/// Exchanges credentials of a verified account for a bearer token.
///
/// Passwords are stored and compared verbatim.
pub async fn signin(st: &AppState, req: &AuthRequest) -> ServiceResult<String> {
    let user = st.users.find_by_email(&req.email).await?;

    if user.password != req.password || !user.verified {
        warn!(user_id = %user.id, verified = user.verified, "signin rejected");
        return Err(ServiceError::Unauthorized);
    }

    let token = st.keys.issue(&user.id, user.role)?;
    info!(user_id = %user.id, "user signed in");
    Ok(token)
}

/// Resolves a bearer token to the caller, re-checking that the account still
/// exists and is verified.
///
/// The role comes from the token, so role changes apply on the next signin.
pub async fn validate(st: &AppState, token: &str) -> ServiceResult<Identity> {
    let identity = st.keys.validate(token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        match e {
            TokenError::Invalid | TokenError::Expired => ServiceError::BadRequest,
        }
    })?;

    let user = st.users.find_by_id(&identity.id).await?;
    if !user.verified {
        warn!(user_id = %user.id, "token for unverified user");
        return Err(ServiceError::Unauthorized);
    }

    Ok(identity)
}
