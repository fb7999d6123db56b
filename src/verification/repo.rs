use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{RepoError, RepoResult},
    verification::repo_types::EmailVerification,
};

#[async_trait]
pub trait VerificationRepo: Send + Sync {
    /// Fails with `Duplicate` when a record for the email already exists.
    async fn insert(&self, v: &EmailVerification) -> RepoResult<()>;
    async fn find_by_email(&self, email: &str) -> RepoResult<EmailVerification>;
    /// Replaces the record keyed by `v.email`.
    async fn update(&self, v: &EmailVerification) -> RepoResult<()>;
    async fn delete(&self, email: &str) -> RepoResult<()>;
}

pub struct PgVerificationRepo {
    db: PgPool,
}

impl PgVerificationRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VerificationRepo for PgVerificationRepo {
    async fn insert(&self, v: &EmailVerification) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO email_verifications (email, code, expiration, cooldown)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&v.email)
        .bind(&v.code)
        .bind(v.expiration)
        .bind(v.cooldown)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<EmailVerification> {
        let v = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT email, code, expiration, cooldown
            FROM email_verifications
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(v)
    }

    async fn update(&self, v: &EmailVerification) -> RepoResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE email_verifications
               SET code = $2, expiration = $3, cooldown = $4
             WHERE email = $1
            "#,
        )
        .bind(&v.email)
        .bind(&v.code)
        .bind(v.expiration)
        .bind(v.cooldown)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, email: &str) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM email_verifications WHERE email = $1")
            .bind(email)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
