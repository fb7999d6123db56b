use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::{
    error::{RepoError, RepoResult},
    stacks::repo_types::{Stack, StackRow},
};

#[async_trait]
pub trait StackRepo: Send + Sync {
    async fn insert(&self, stack: &Stack) -> RepoResult<()>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Stack>;
    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<Stack>>;
    async fn find_all(&self) -> RepoResult<Vec<Stack>>;
    /// Overwrites the whole document with id `stack.id`.
    async fn update(&self, stack: &Stack) -> RepoResult<()>;
}

pub struct PgStackRepo {
    db: PgPool,
}

impl PgStackRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StackRepo for PgStackRepo {
    async fn insert(&self, stack: &Stack) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stacks (id, owner, items)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&stack.id)
        .bind(&stack.owner)
        .bind(Json(&stack.items))
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> RepoResult<Stack> {
        let row = sqlx::query_as::<_, StackRow>(
            r#"
            SELECT id, owner, items
            FROM stacks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn find_by_owner(&self, owner: &str) -> RepoResult<Vec<Stack>> {
        let rows = sqlx::query_as::<_, StackRow>(
            r#"
            SELECT id, owner, items
            FROM stacks
            WHERE owner = $1
            ORDER BY id
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Stack::from).collect())
    }

    async fn find_all(&self) -> RepoResult<Vec<Stack>> {
        let rows = sqlx::query_as::<_, StackRow>(
            r#"
            SELECT id, owner, items
            FROM stacks
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(Stack::from).collect())
    }

    async fn update(&self, stack: &Stack) -> RepoResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE stacks
               SET owner = $2, items = $3
             WHERE id = $1
            "#,
        )
        .bind(&stack.id)
        .bind(&stack.owner)
        .bind(Json(&stack.items))
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
