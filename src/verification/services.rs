use time::Duration;
use tracing::{info, warn};

use crate::{
    error::{ServiceError, ServiceResult},
    state::AppState,
    verification::repo_types::EmailVerification,
};

pub const CODE_TTL: Duration = Duration::minutes(10);
pub const RESEND_COOLDOWN: Duration = Duration::minutes(1);

/// Sends a fresh code to `email` and records it.
///
/// The mail goes out before the insert, so a `Duplicate` failure still
/// leaves a code in the recipient's inbox that will never verify.
pub async fn create(st: &AppState, email: &str) -> ServiceResult<EmailVerification> {
    let code = st.codes.generate();
    st.mailer.send(email, &code).await?;

    let now = st.clock.unix();
    let v = EmailVerification {
        email: email.to_string(),
        code,
        expiration: now + CODE_TTL.whole_seconds(),
        cooldown: now + RESEND_COOLDOWN.whole_seconds(),
    };
    st.verifications.insert(&v).await?;

    info!(email = %email, "verification created");
    Ok(v)
}

/// Replaces the pending code for `email` once the cooldown has passed.
pub async fn recreate(st: &AppState, email: &str) -> ServiceResult<EmailVerification> {
    let mut v = st.verifications.find_by_email(email).await?;

    let now = st.clock.unix();
    if now < v.cooldown {
        warn!(email = %email, retry_in = v.cooldown - now, "resend during cooldown");
        return Err(ServiceError::Unauthorized);
    }

    v.code = st.codes.generate();
    v.expiration = now + CODE_TTL.whole_seconds();
    v.cooldown = now + RESEND_COOLDOWN.whole_seconds();

    st.mailer.send(email, &v.code).await?;
    st.verifications.update(&v).await?;

    info!(email = %email, "verification resent");
    Ok(v)
}

/// Consumes the pending code for `email` if it matches and has not expired.
pub async fn verify(st: &AppState, email: &str, code: &str) -> ServiceResult<()> {
    let v = st.verifications.find_by_email(email).await?;

    if st.clock.unix() >= v.expiration {
        warn!(email = %email, "verification code expired");
        return Err(ServiceError::Unauthorized);
    }
    if v.code != code {
        warn!(email = %email, "verification code mismatch");
        return Err(ServiceError::Unauthorized);
    }

    st.verifications.delete(email).await?;
    Ok(())
}
