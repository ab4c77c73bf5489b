use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::session::models::RefreshToken;
use crate::domain::session::models::RefreshTokenId;
use crate::domain::session::ports::RefreshTokenStore;
use crate::domain::user::models::UserId;

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: RefreshTokenId(row.id),
            user_id: UserId(row.user_id),
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            revoked: row.revoked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL refresh token store.
///
/// Rotation is a conditional update plus insert inside one transaction, so
/// concurrent rotations of the same token serialize on the row lock and at
/// most one of them sees an affected row.
pub struct PostgresRefreshTokenStore {
    pool: PgPool,
}

impl PostgresRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_token<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens
            (id, user_id, token_hash, expires_at, revoked, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(token.id.0)
    .bind(token.user_id.0)
    .bind(&token.token_hash)
    .bind(token.expires_at)
    .bind(token.revoked)
    .bind(token.created_at)
    .bind(token.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl RefreshTokenStore for PostgresRefreshTokenStore {
    async fn insert(&self, token: RefreshToken) -> Result<(), StoreError> {
        insert_token(&self.pool, &token).await?;
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<RefreshToken>, StoreError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT id, user_id, token_hash, expires_at, revoked, created_at, updated_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshToken::from))
    }

    async fn rotate(
        &self,
        old_hash: &str,
        replacement: RefreshToken,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let revoked = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = $2
            WHERE token_hash = $1
              AND user_id = $3
              AND revoked = FALSE
              AND expires_at > $2
            "#,
        )
        .bind(old_hash)
        .bind(now)
        .bind(replacement.user_id.0)
        .execute(&mut *tx)
        .await?;

        if revoked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_token(&mut *tx, &replacement).await?;
        tx.commit().await?;

        Ok(true)
    }

    async fn revoke(&self, token_hash: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = $2
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
