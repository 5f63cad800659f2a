use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::RepoError;

/// DB access for refresh token persistence.
///
/// Only the SHA-256 of a token is stored. Rotation revokes the presented
/// token and links it to its successor through `replaced_by`.
#[derive(Clone, Debug)]
pub struct RefreshTokenRepo {
    pool: PgPool,
}

impl RefreshTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a newly issued refresh token.
    pub async fn insert(
        &self,
        session_id: Uuid,
        token_hash: Vec<u8>,
        expires_at: DateTime<Utc>,
    ) -> Result<Uuid, RepoError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO refresh_tokens (session_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(session_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(id)
    }

    /// Fetch a refresh token row by hash, only if it is not revoked and not expired.
    pub async fn find_active_by_hash(
        &self,
        token_hash: Vec<u8>,
        now: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRow>, RepoError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT
                id,
                session_id,
                issued_at,
                expires_at,
                revoked_at,
                replaced_by
            FROM refresh_tokens
            WHERE token_hash = $1
                AND revoked_at IS NULL
                AND expires_at > $2
            LIMIT 1
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    /// Revoke a refresh token. Returns 0 when it was already revoked, which
    /// is how a concurrent rotation of the same token is detected.
    pub async fn revoke(
        &self,
        id: Uuid,
        replaced_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let done = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2,
                replaced_by = $3
            WHERE id = $1
                AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(replaced_by)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(done.rows_affected())
    }

    pub async fn revoke_session(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, RepoError> {
        let done = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2
            WHERE session_id = $1
                AND revoked_at IS NULL
            "#,
        )
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(done.rows_affected())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub replaced_by: Option<Uuid>,
}
