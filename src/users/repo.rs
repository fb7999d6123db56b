use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{RepoError, RepoResult},
    users::repo_types::{User, UserRow},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts `user` as given; the caller assigns the id.
    async fn insert(&self, user: &User) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str) -> RepoResult<User>;
    async fn find_by_email(&self, email: &str) -> RepoResult<User>;
    async fn find_all(&self) -> RepoResult<Vec<User>>;
    /// Replaces the whole document matching `user.id`.
    async fn update(&self, user: &User) -> RepoResult<()>;
    /// Touches only the name column.
    async fn update_name(&self, id: &str, name: &str) -> RepoResult<()>;
    async fn delete(&self, id: &str) -> RepoResult<()>;
}

pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn insert(&self, user: &User) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, role, email, password, verified)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(i16::from(u8::from(user.role)))
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.verified)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, role, email, password, verified
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(User::try_from(row)?)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, role, email, password, verified
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(User::try_from(row)?)
    }

    async fn find_all(&self) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, role, email, password, verified
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        rows.into_iter()
            .map(|r| User::try_from(r).map_err(RepoError::from))
            .collect()
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name = $2, role = $3, email = $4, password = $5, verified = $6
             WHERE id = $1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(i16::from(u8::from(user.role)))
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.verified)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn update_name(&self, id: &str, name: &str) -> RepoResult<()> {
        let res = sqlx::query("UPDATE users SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
