use tracing::{info, warn};

use crate::{
    error::{ServiceError, ServiceResult},
    state::AppState,
    users::{
        dto::{
            is_valid_email, is_valid_name, EmailVerificationRequest, ResendRequest,
            UserCreateRequest, UserResponse, UserUpdateRequest,
        },
        repo_types::{User, UserRole},
    },
    verification,
};

/// Registers an unverified client account and mails its verification code.
///
/// The mail and the insert run concurrently and are both awaited. Neither is
/// rolled back when the other fails: a duplicate email may still get a mail,
/// and a failed mail leaves an account whose first resend reports `NotFound`.
pub async fn create(st: &AppState, req: UserCreateRequest) -> ServiceResult<UserResponse> {
    if !req.is_valid() {
        return Err(ServiceError::BadRequest);
    }

    let user = User {
        id: st.ids.generate(),
        name: req.name,
        role: UserRole::Client,
        email: req.email,
        password: req.password,
        verified: false,
    };

    let (mailed, inserted) = tokio::join!(
        verification::services::create(st, &user.email),
        st.users.insert(&user),
    );
    inserted?;
    if let Err(e) = mailed {
        warn!(user_id = %user.id, error = %e, "user created but verification not issued");
        return Err(e);
    }

    info!(user_id = %user.id, "user registered");
    Ok(user.into())
}

pub async fn find_by_id(st: &AppState, id: &str) -> ServiceResult<UserResponse> {
    Ok(st.users.find_by_id(id).await?.into())
}

pub async fn find_all(st: &AppState) -> ServiceResult<Vec<UserResponse>> {
    let users = st.users.find_all().await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Renames a user. Nothing else about the account changes, so a concurrent
/// verification or role change is never written back over.
pub async fn update(st: &AppState, id: &str, req: UserUpdateRequest) -> ServiceResult<UserResponse> {
    if !is_valid_name(&req.name) {
        return Err(ServiceError::BadRequest);
    }
    st.users.update_name(id, &req.name).await?;
    Ok(UserResponse {
        id: id.to_string(),
        name: req.name,
    })
}

/// Removes the account only; its stacks stay behind.
pub async fn delete(st: &AppState, id: &str) -> ServiceResult<()> {
    st.users.delete(id).await?;
    info!(user_id = %id, "user deleted");
    Ok(())
}

pub async fn resend(st: &AppState, req: ResendRequest) -> ServiceResult<()> {
    if !is_valid_email(&req.email) {
        return Err(ServiceError::BadRequest);
    }
    verification::services::recreate(st, &req.email).await?;
    Ok(())
}

/// Consumes the verification code and marks the account verified.
pub async fn verify(st: &AppState, req: EmailVerificationRequest) -> ServiceResult<UserResponse> {
    if !req.is_valid() {
        return Err(ServiceError::BadRequest);
    }
    verification::services::verify(st, &req.email, &req.code).await?;

    let mut user = st.users.find_by_email(&req.email).await?;
    user.verified = true;
    st.users.update(&user).await?;

    info!(user_id = %user.id, "user verified");
    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{auth, auth::dto::AuthRequest, memory::ConcurrentVerifyUserRepo, state::AppState};

    fn ann() -> UserCreateRequest {
        UserCreateRequest {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password: "password1".into(),
        }
    }

    fn verify_req(email: &str, code: &str) -> EmailVerificationRequest {
        EmailVerificationRequest { email: email.into(), code: code.into() }
    }

    #[tokio::test]
    async fn signup_verify_signin_scenario() {
        let fx = AppState::fake();
        let created = create(&fx.state, ann()).await.unwrap();
        assert_eq!(created.name, "Ann");

        let stored = fx.state.users.find_by_id(&created.id).await.unwrap();
        assert!(!stored.verified);
        assert_eq!(stored.role, UserRole::Client);

        let creds = AuthRequest { email: "ann@x.com".into(), password: "password1".into() };
        let err = auth::services::signin(&fx.state, &creds).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        let err = verify(&fx.state, verify_req("ann@x.com", "WRONG1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        let code = fx.mailer.last_code_for("ann@x.com").unwrap();
        let verified = verify(&fx.state, verify_req("ann@x.com", &code)).await.unwrap();
        assert_eq!(verified, UserResponse { id: created.id.clone(), name: "Ann".into() });
        assert!(fx.state.users.find_by_id(&created.id).await.unwrap().verified);

        auth::services::signin(&fx.state, &creds).await.unwrap();

        let err = verify(&fx.state, verify_req("ann@x.com", &code)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn signup_rejects_invalid_input() {
        let fx = AppState::fake();
        let req = UserCreateRequest { password: "short".into(), ..ann() };
        let err = create(&fx.state, req).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest));
        assert_eq!(fx.mailer.sent_count(), 0);
    }

    #[tokio::test]
    async fn signup_twice_is_duplicate() {
        let fx = AppState::fake();
        create(&fx.state, ann()).await.unwrap();
        let err = create(&fx.state, ann()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate));
    }

    #[tokio::test]
    async fn signup_with_mail_failure_keeps_account() {
        let fx = AppState::fake();
        fx.mailer.set_failing(true);
        let err = create(&fx.state, ann()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));

        assert!(!fx.state.users.find_by_email("ann@x.com").await.unwrap().verified);
        let err = resend(&fx.state, ResendRequest { email: "ann@x.com".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn resend_after_cooldown_issues_new_code() {
        let fx = AppState::fake();
        create(&fx.state, ann()).await.unwrap();
        let old = fx.mailer.last_code_for("ann@x.com").unwrap();

        let err = resend(&fx.state, ResendRequest { email: "ann@x.com".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));

        fx.clock.advance(time::Duration::minutes(1));
        resend(&fx.state, ResendRequest { email: "ann@x.com".into() }).await.unwrap();
        let new = fx.mailer.last_code_for("ann@x.com").unwrap();
        assert_ne!(new, old);
        let err = verify(&fx.state, verify_req("ann@x.com", &old)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized));
        verify(&fx.state, verify_req("ann@x.com", &new)).await.unwrap();
    }

    #[tokio::test]
    async fn resend_validates_email() {
        let fx = AppState::fake();
        let err = resend(&fx.state, ResendRequest { email: "nope".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest));
    }

    #[tokio::test]
    async fn update_changes_name_only() {
        let fx = AppState::fake();
        let user = fx.seed_user("Ann", "ann@x.com", UserRole::Admin, true).await;

        let updated = update(&fx.state, &user.id, UserUpdateRequest { name: "Annie".into() })
            .await
            .unwrap();
        assert_eq!(updated.name, "Annie");

        let stored = fx.state.users.find_by_id(&user.id).await.unwrap();
        assert_eq!(stored, User { name: "Annie".into(), ..user });
    }

    #[tokio::test]
    async fn rename_keeps_a_concurrent_verification() {
        let mut fx = AppState::fake();
        fx.state.users = Arc::new(ConcurrentVerifyUserRepo::default());
        let user = fx.seed_user("Ann", "ann@x.com", UserRole::Client, false).await;

        let renamed = update(&fx.state, &user.id, UserUpdateRequest { name: "Annie".into() })
            .await
            .unwrap();
        assert_eq!(renamed, UserResponse { id: user.id.clone(), name: "Annie".into() });

        let stored = fx.state.users.find_by_email("ann@x.com").await.unwrap();
        assert_eq!(stored, User { name: "Annie".into(), verified: true, ..user });
    }

    #[tokio::test]
    async fn update_and_delete_missing_user_are_not_found() {
        let fx = AppState::fake();
        let err = update(&fx.state, "404", UserUpdateRequest { name: "X".into() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
        let err = delete(&fx.state, "404").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }

    #[tokio::test]
    async fn update_rejects_empty_name() {
        let fx = AppState::fake();
        let user = fx.seed_user("Ann", "ann@x.com", UserRole::Client, true).await;
        let err = update(&fx.state, &user.id, UserUpdateRequest { name: String::new() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest));
    }

    #[tokio::test]
    async fn delete_leaves_stacks_behind() {
        let fx = AppState::fake();
        let user = fx.seed_user("Ann", "ann@x.com", UserRole::Client, true).await;
        let stack = crate::stacks::services::create(&fx.state, &user.id).await.unwrap();

        delete(&fx.state, &user.id).await.unwrap();
        let orphan = crate::stacks::services::find_by_id(&fx.state, &stack.id).await.unwrap();
        assert_eq!(orphan.owner, user.id);
    }
}
