use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

/// One row per login. Refresh tokens hang off a session; revoking the
/// session ends every token issued for it.
#[derive(Clone, Debug)]
pub struct AuthSessionRepo {
    pool: PgPool,
}

impl AuthSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid) -> RepoResult<AuthSessionRow> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            INSERT INTO auth_sessions (user_id)
            VALUES ($1)
            RETURNING id, user_id, created_at, refreshed_at, revoked_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    // Owner of an active (not revoked) session.
    pub async fn lookup_user(&self, session_id: Uuid) -> RepoResult<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM auth_sessions
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(user_id)
    }

    // Record a successful refresh. Caller decides what now is.
    pub async fn touch_refreshed(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET refreshed_at = $2
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(res.rows_affected())
    }

    pub async fn revoke(&self, id: Uuid, revoked_at: DateTime<Utc>) -> RepoResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET revoked_at = $2
            WHERE id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(id)
        .bind(revoked_at)
        .execute(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(res.rows_affected())
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct AuthSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}
